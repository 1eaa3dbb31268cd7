//! Mods for [`SelectQuery`](crate::SelectQuery).

use compact_str::CompactString;
use mortar_core::chain::{CteChain, FromChain, IndexHintChain, JoinChain, LockChain, OrderBy, WindowChain};
use mortar_core::clause::{IndexHintKind, JoinKind, LockStrength};
use mortar_core::expr::{Expr, Expression};
use mortar_core::mods::{
    AddHook, AddLoader, AddMapperMod, Columns, Distinct, GroupBy, Having, Limit, Mod, Offset,
    Partition, Recursive, Where,
};
use mortar_core::{Loader, MapperMod, QueryHook};

use crate::SelectQuery;

/// Selects `columns`; without any, the query selects `*`.
pub fn columns<I>(columns: I) -> Columns
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Columns::new(columns)
}

pub fn distinct() -> Distinct {
    Distinct
}

/// Sets the table; chain `r#as`, `partition` and index hints onto it.
pub fn from(table: impl Into<Expr>) -> FromChain {
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

pub fn cross_join(to: impl Into<Expr>) -> JoinChain {
    JoinChain::new(JoinKind::Cross, to)
}

pub fn straight_join(to: impl Into<Expr>) -> JoinChain {
    JoinChain::new(JoinKind::Straight, to)
}

pub fn r#where(cond: impl Into<Expr>) -> Where {
    Where::new(cond)
}

pub fn group_by(expr: impl Into<Expr>) -> GroupBy {
    GroupBy::new(expr)
}

/// Adds `WITH ROLLUP` after GROUP BY.
pub fn with_rollup() -> WithRollup {
    WithRollup
}

pub fn having(cond: impl Into<Expr>) -> Having {
    Having::new(cond)
}

/// Adds a named window to the WINDOW clause.
pub fn window(name: impl Into<CompactString>) -> WindowChain {
    WindowChain::named(name)
}

pub fn order_by(expr: impl Into<Expr>) -> OrderBy {
    OrderBy::new(expr)
}

pub fn limit(count: impl Into<Expr>) -> Limit {
    Limit::new(count)
}

pub fn offset(count: impl Into<Expr>) -> Offset {
    Offset::new(count)
}

/// Adds a CTE; it must be completed with `r#as(query)`.
pub fn with(name: impl Into<CompactString>) -> CteChain {
    CteChain::new(name)
}

pub fn recursive(recursive: bool) -> Recursive {
    Recursive(recursive)
}

pub fn for_update<I>(tables: I) -> LockChain
where
    I: IntoIterator,
    I::Item: Into<CompactString>,
{
    LockChain::new(LockStrength::Update, tables)
}

pub fn for_share<I>(tables: I) -> LockChain
where
    I: IntoIterator,
    I::Item: Into<CompactString>,
{
    LockChain::new(LockStrength::Share, tables)
}

pub fn loader(loader: impl Loader + 'static) -> AddLoader {
    AddLoader::new(loader)
}

pub fn mapper_mod(m: impl MapperMod + 'static) -> AddMapperMod {
    AddMapperMod::new(m)
}

pub fn hook(hook: impl QueryHook + 'static) -> AddHook {
    AddHook::new(hook)
}

#[derive(Debug, Clone, Copy)]
pub struct WithRollup;

impl Mod<SelectQuery> for WithRollup {
    fn apply(&self, q: &mut SelectQuery) {
        q.set_with_rollup(true);
    }
}

/// Uses a query as a CTE body or subquery.
pub fn subquery(q: impl Expression + 'static) -> Expr {
    mortar_core::expr::subquery(q)
}
