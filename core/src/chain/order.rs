use compact_str::CompactString;

use crate::clause::{Direction, OrderDef};
use crate::expr::Expr;
use crate::mods::{AppendOrder, Mod};

/// An ORDER BY term; direction and collation are set independently.
#[derive(Debug, Clone)]
pub struct OrderBy {
    def: OrderDef,
}

impl OrderBy {
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            def: OrderDef::new(expr),
        }
    }

    fn direction(&self, direction: Direction) -> Self {
        let mut def = self.def.clone();
        def.direction = Some(direction);
        Self { def }
    }

    #[must_use]
    pub fn asc(&self) -> Self {
        self.direction(Direction::Asc)
    }

    #[must_use]
    pub fn desc(&self) -> Self {
        self.direction(Direction::Desc)
    }

    #[must_use]
    pub fn collate(&self, collation: impl Into<CompactString>) -> Self {
        let mut def = self.def.clone();
        def.collation = Some(collation.into());
        Self { def }
    }
}

impl<Q: AppendOrder> Mod<Q> for OrderBy {
    fn apply(&self, q: &mut Q) {
        q.append_order(self.def.clone());
    }
}

impl From<OrderBy> for OrderDef {
    fn from(o: OrderBy) -> Self {
        o.def
    }
}
