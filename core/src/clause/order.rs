use compact_str::CompactString;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::expr::{Expr, Expression};
use crate::param::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ORDER BY term: `expr [COLLATE name] [ASC|DESC]`
///
/// No direction leaves the database's default ordering.
#[derive(Debug, Clone)]
pub struct OrderDef {
    pub expr: Expr,
    pub direction: Option<Direction>,
    pub collation: Option<CompactString>,
}

impl OrderDef {
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: None,
            collation: None,
        }
    }
}

impl Expression for OrderDef {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        let params = self.expr.write_sql(w, d, start)?;
        if let Some(collation) = &self.collation {
            w.push_str(" COLLATE ");
            w.push_str(collation);
        }
        if let Some(direction) = self.direction {
            w.push(' ');
            w.push_str(direction.as_str());
        }
        Ok(params)
    }
}

impl From<&str> for OrderDef {
    fn from(s: &str) -> Self {
        OrderDef::new(s)
    }
}

impl From<Expr> for OrderDef {
    fn from(e: Expr) -> Self {
        OrderDef::new(e)
    }
}
