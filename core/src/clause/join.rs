use compact_str::CompactString;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::expr::{Expr, Expression, Logic, write_logical, write_names};
use crate::param::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
    Straight,
}

impl JoinKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Cross => "CROSS JOIN",
            JoinKind::Straight => "STRAIGHT_JOIN",
        }
    }
}

/// `[NATURAL] KIND target [AS alias] [ON ...] [USING (...)]`
///
/// `natural` and `on`/`using` are not cross-checked; the database rejects
/// contradictory combinations.
#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub to: Expr,
    pub alias: Option<CompactString>,
    pub natural: bool,
    /// Conditions ANDed together in order
    pub on: Vec<Expr>,
    pub using: Vec<CompactString>,
}

impl Join {
    pub fn new(kind: JoinKind, to: impl Into<Expr>) -> Self {
        Self {
            kind,
            to: to.into(),
            alias: None,
            natural: false,
            on: Vec::new(),
            using: Vec::new(),
        }
    }
}

impl Expression for Join {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        if self.natural {
            w.push_str("NATURAL ");
        }
        w.push_str(self.kind.as_str());
        w.push(' ');
        let mut params = self.to.write_sql(w, d, start)?;

        if let Some(alias) = &self.alias {
            w.push_str(" AS ");
            w.push_str(alias);
        }

        if !self.on.is_empty() {
            w.push_str(" ON ");
            params.extend(write_logical(
                w,
                d,
                start + params.len(),
                &self.on,
                Logic::And,
            )?);
        }

        if !self.using.is_empty() {
            w.push_str(" USING (");
            write_names(w, &self.using);
            w.push(')');
        }

        Ok(params)
    }
}
