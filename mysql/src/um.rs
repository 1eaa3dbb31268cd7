//! Mods for [`UpdateQuery`](crate::UpdateQuery).

use compact_str::CompactString;
use mortar_core::chain::{CteChain, FromChain, IndexHintChain, JoinChain, OrderBy};
use mortar_core::clause::{IndexHintKind, JoinKind};
use mortar_core::expr::{self, Expr};
use mortar_core::mods::{AddHook, AddLoader, Limit, Mod, Partition, Recursive, Where};
use mortar_core::value::Value;
use mortar_core::{Loader, QueryHook};

use crate::update::{Set, UpdateQuery};

/// Sets the table to update.
pub fn table(table: impl Into<Expr>) -> FromChain {
    FromChain::new(table)
}

pub fn partition<I>(names: I) -> Partition
where
    I: IntoIterator,
    I::Item: Into<CompactString>,
{
    Partition::new(names)
}

pub fn use_index<I>(indexes: I) -> IndexHintChain
where
    I: IntoIterator,
    I::Item: Into<CompactString>,
{
    IndexHintChain::new(IndexHintKind::Use, indexes)
}

pub fn ignore_index<I>(indexes: I) -> IndexHintChain
where
    I: IntoIterator,
    I::Item: Into<CompactString>,
{
    IndexHintChain::new(IndexHintKind::Ignore, indexes)
}

pub fn force_index<I>(indexes: I) -> IndexHintChain
where
    I: IntoIterator,
    I::Item: Into<CompactString>,
{
    IndexHintChain::new(IndexHintKind::Force, indexes)
}

pub fn inner_join(to: impl Into<Expr>) -> JoinChain {
    JoinChain::new(JoinKind::Inner, to)
}

pub fn left_join(to: impl Into<Expr>) -> JoinChain {
    JoinChain::new(JoinKind::Left, to)
}

pub fn right_join(to: impl Into<Expr>) -> JoinChain {
    JoinChain::new(JoinKind::Right, to)
}

pub fn straight_join(to: impl Into<Expr>) -> JoinChain {
    JoinChain::new(JoinKind::Straight, to)
}

/// Starts a `column = ...` assignment.
pub fn set(column: impl Into<Expr>) -> SetCol {
    SetCol(column.into())
}

/// A column waiting for its new value
#[derive(Debug, Clone)]
pub struct SetCol(Expr);

impl SetCol {
    /// Assigns an expression.
    pub fn to(&self, value: impl Into<Expr>) -> Set {
        Set {
            column: self.0.clone(),
            value: value.into(),
        }
    }

    /// Assigns a bound argument.
    pub fn to_arg(&self, value: impl Into<Value>) -> Set {
        self.to(expr::args([value.into()]))
    }
}

pub fn r#where(cond: impl Into<Expr>) -> Where {
    Where::new(cond)
}

pub fn order_by(expr: impl Into<Expr>) -> OrderBy {
    OrderBy::new(expr)
}

pub fn limit(count: impl Into<Expr>) -> Limit {
    Limit::new(count)
}

pub fn with(name: impl Into<CompactString>) -> CteChain {
    CteChain::new(name)
}

pub fn recursive(recursive: bool) -> Recursive {
    Recursive(recursive)
}

pub fn low_priority() -> LowPriority {
    LowPriority
}

pub fn ignore() -> Ignore {
    Ignore
}

pub fn loader(loader: impl Loader + 'static) -> AddLoader {
    AddLoader::new(loader)
}

pub fn hook(hook: impl QueryHook + 'static) -> AddHook {
    AddHook::new(hook)
}

#[derive(Debug, Clone, Copy)]
pub struct LowPriority;

impl Mod<UpdateQuery> for LowPriority {
    fn apply(&self, q: &mut UpdateQuery) {
        q.set_low_priority(true);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ignore;

impl Mod<UpdateQuery> for Ignore {
    fn apply(&self, q: &mut UpdateQuery) {
        q.set_ignore(true);
    }
}
