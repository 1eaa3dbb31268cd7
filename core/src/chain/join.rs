use compact_str::CompactString;

use crate::clause::{Join, JoinKind};
use crate::expr::Expr;
use crate::mods::{AppendJoin, Mod};

/// A join that has a target and possibly an alias, but no condition yet.
///
/// Applying it as-is appends an unconditioned join (e.g. `CROSS JOIN t`).
/// [`natural`](Self::natural), [`on`](Self::on), [`on_eq`](Self::on_eq) and
/// [`using`](Self::using) complete it into a [`JoinMod`].
#[derive(Debug, Clone)]
pub struct JoinChain {
    join: Join,
}

impl JoinChain {
    pub fn new(kind: JoinKind, to: impl Into<Expr>) -> Self {
        Self {
            join: Join::new(kind, to),
        }
    }

    #[must_use]
    pub fn r#as(&self, alias: impl Into<CompactString>) -> Self {
        let mut join = self.join.clone();
        join.alias = Some(alias.into());
        Self { join }
    }

    pub fn natural(&self) -> JoinMod {
        let mut join = self.join.clone();
        join.natural = true;
        JoinMod { join }
    }

    pub fn on(&self, cond: impl Into<Expr>) -> JoinMod {
        JoinMod {
            join: self.join.clone(),
        }
        .on(cond)
    }

    /// Sugar for `on(left = right)`.
    pub fn on_eq(&self, left: impl Into<Expr>, right: impl Into<Expr>) -> JoinMod {
        let left: Expr = left.into();
        self.on(left.eq(right))
    }

    pub fn using<I>(&self, columns: I) -> JoinMod
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        let mut join = self.join.clone();
        join.using.extend(columns.into_iter().map(Into::into));
        JoinMod { join }
    }
}

impl<Q: AppendJoin> Mod<Q> for JoinChain {
    fn apply(&self, q: &mut Q) {
        q.append_join(self.join.clone());
    }
}

/// A complete join, ready to apply.
///
/// Further `on` calls add conditions to the conjunction.
#[derive(Debug, Clone)]
pub struct JoinMod {
    join: Join,
}

impl JoinMod {
    /// Wraps an already-built join clause.
    pub fn new(join: Join) -> Self {
        Self { join }
    }

    #[must_use]
    pub fn on(&self, cond: impl Into<Expr>) -> Self {
        let mut join = self.join.clone();
        join.on.push(cond.into());
        Self { join }
    }

    #[must_use]
    pub fn on_eq(&self, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        let left: Expr = left.into();
        self.on(left.eq(right))
    }

    pub fn join(&self) -> &Join {
        &self.join
    }
}

impl<Q: AppendJoin> Mod<Q> for JoinMod {
    fn apply(&self, q: &mut Q) {
        q.append_join(self.join.clone());
    }
}
