//! Mods and capability traits.
//!
//! A [`Mod`] is a unit of change applied to a query. Mods only ask for the
//! capability they use: a mod that appends a JOIN works on any query type
//! implementing [`AppendJoin`] and is a compile error on any other.
//!
//! ```compile_fail
//! use mortar_core::mods::{AppendWhere, Mod, Where};
//!
//! struct NoWhere;
//!
//! fn apply<Q, M: Mod<Q>>(q: &mut Q, m: M) {
//!     m.apply(q);
//! }
//!
//! // `NoWhere` does not implement `AppendWhere`.
//! apply(&mut NoWhere, Where::new("a = 1"));
//! ```
//!
//! Applying the same mod twice appends its clause twice.

use std::sync::Arc;

use compact_str::CompactString;

use crate::clause::{Cte, FromClause, IndexHint, Join, Lock, NamedWindow, OrderDef};
use crate::expr::Expr;
use crate::hook::QueryHook;
use crate::load::Loader;
use crate::scan::MapperMod;

/// A unit of mutation applied to a query of type `Q`
pub trait Mod<Q> {
    fn apply(&self, q: &mut Q);
}

impl<Q, M: Mod<Q> + ?Sized> Mod<Q> for &M {
    #[inline]
    fn apply(&self, q: &mut Q) {
        (**self).apply(q);
    }
}

impl<Q, M: Mod<Q> + ?Sized> Mod<Q> for Box<M> {
    #[inline]
    fn apply(&self, q: &mut Q) {
        (**self).apply(q);
    }
}

impl<Q, M: Mod<Q> + ?Sized> Mod<Q> for Arc<M> {
    #[inline]
    fn apply(&self, q: &mut Q) {
        (**self).apply(q);
    }
}

impl<Q, M: Mod<Q>> Mod<Q> for [M] {
    fn apply(&self, q: &mut Q) {
        for m in self {
            m.apply(q);
        }
    }
}

impl<Q, M: Mod<Q>> Mod<Q> for Vec<M> {
    fn apply(&self, q: &mut Q) {
        self.as_slice().apply(q);
    }
}

/// Applies the mod only when present.
impl<Q, M: Mod<Q>> Mod<Q> for Option<M> {
    fn apply(&self, q: &mut Q) {
        if let Some(m) = self {
            m.apply(q);
        }
    }
}

impl<Q> Mod<Q> for () {
    #[inline]
    fn apply(&self, _q: &mut Q) {}
}

macro_rules! impl_mod_tuple {
    ($($name:ident),+) => {
        impl<Q, $($name: Mod<Q>),+> Mod<Q> for ($($name,)+) {
            #[allow(non_snake_case)]
            fn apply(&self, q: &mut Q) {
                let ($($name,)+) = self;
                $($name.apply(q);)+
            }
        }
    };
}

impl_mod_tuple!(A);
impl_mod_tuple!(A, B);
impl_mod_tuple!(A, B, C);
impl_mod_tuple!(A, B, C, D);
impl_mod_tuple!(A, B, C, D, E);
impl_mod_tuple!(A, B, C, D, E, F);
impl_mod_tuple!(A, B, C, D, E, F, G);
impl_mod_tuple!(A, B, C, D, E, F, G, H);
impl_mod_tuple!(A, B, C, D, E, F, G, H, I);
impl_mod_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_mod_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_mod_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);

/// A mod from a closure.
#[derive(Clone, Copy)]
pub struct ModFn<F>(F);

pub fn mod_fn<Q, F: Fn(&mut Q)>(f: F) -> ModFn<F> {
    ModFn(f)
}

impl<Q, F: Fn(&mut Q)> Mod<Q> for ModFn<F> {
    #[inline]
    fn apply(&self, q: &mut Q) {
        (self.0)(q);
    }
}

// =============================================================================
// Capabilities
// =============================================================================

pub trait SetTable {
    fn set_table(&mut self, from: FromClause);
}

pub trait AppendPartition {
    fn append_partition(&mut self, name: CompactString);
}

pub trait AppendIndexHint {
    fn append_index_hint(&mut self, hint: IndexHint);
}

pub trait AppendJoin {
    fn append_join(&mut self, join: Join);
}

pub trait AppendOrder {
    fn append_order(&mut self, order: OrderDef);
}

pub trait AppendWith {
    fn append_with(&mut self, cte: Cte);
    fn set_recursive(&mut self, recursive: bool);
}

pub trait SetFor {
    fn set_for(&mut self, lock: Lock);
}

pub trait AppendWindow {
    fn append_window(&mut self, window: NamedWindow);
}

pub trait AppendWhere {
    fn append_where(&mut self, cond: Expr);
}

pub trait AppendHaving {
    fn append_having(&mut self, cond: Expr);
}

pub trait AppendGroup {
    fn append_group(&mut self, expr: Expr);
}

pub trait AppendSelect {
    fn append_select(&mut self, column: Expr);
}

pub trait SetDistinct {
    fn set_distinct(&mut self, distinct: bool);
}

pub trait SetLimit {
    fn set_limit(&mut self, limit: Expr);
}

pub trait SetOffset {
    fn set_offset(&mut self, offset: Expr);
}

pub trait AppendLoader {
    fn append_loader(&mut self, loader: Arc<dyn Loader>);
    fn append_mapper_mod(&mut self, m: Arc<dyn MapperMod>);
}

pub trait AppendHook {
    fn append_hook(&mut self, hook: Arc<dyn QueryHook>);
}

// =============================================================================
// Generic mods
// =============================================================================

macro_rules! expr_mod {
    ($(#[$meta:meta])* $name:ident, $cap:ident, $method:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub Expr);

        impl $name {
            pub fn new(e: impl Into<Expr>) -> Self {
                Self(e.into())
            }
        }

        impl<Q: $cap> Mod<Q> for $name {
            #[inline]
            fn apply(&self, q: &mut Q) {
                q.$method(self.0.clone());
            }
        }
    };
}

expr_mod!(
    /// Adds a condition to WHERE; conditions are ANDed.
    Where, AppendWhere, append_where
);
expr_mod!(
    /// Adds a condition to HAVING; conditions are ANDed.
    Having, AppendHaving, append_having
);
expr_mod!(GroupBy, AppendGroup, append_group);
expr_mod!(Limit, SetLimit, set_limit);
expr_mod!(Offset, SetOffset, set_offset);

/// Appends selected columns.
#[derive(Debug, Clone)]
pub struct Columns(pub Vec<Expr>);

impl Columns {
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        Self(columns.into_iter().map(Into::into).collect())
    }
}

impl<Q: AppendSelect> Mod<Q> for Columns {
    fn apply(&self, q: &mut Q) {
        for c in &self.0 {
            q.append_select(c.clone());
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Distinct;

impl<Q: SetDistinct> Mod<Q> for Distinct {
    #[inline]
    fn apply(&self, q: &mut Q) {
        q.set_distinct(true);
    }
}

/// Marks the WITH clause as `WITH RECURSIVE`.
#[derive(Debug, Clone, Copy)]
pub struct Recursive(pub bool);

impl<Q: AppendWith> Mod<Q> for Recursive {
    #[inline]
    fn apply(&self, q: &mut Q) {
        q.set_recursive(self.0);
    }
}

/// Appends partition names to the table reference.
#[derive(Debug, Clone)]
pub struct Partition(pub Vec<CompactString>);

impl Partition {
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

impl<Q: AppendPartition> Mod<Q> for Partition {
    fn apply(&self, q: &mut Q) {
        for p in &self.0 {
            q.append_partition(p.clone());
        }
    }
}

#[derive(Clone)]
pub struct AddLoader(pub Arc<dyn Loader>);

impl AddLoader {
    pub fn new(inner: impl Loader + 'static) -> Self {
        Self(Arc::new(inner))
    }
}

impl<Q: AppendLoader> Mod<Q> for AddLoader {
    #[inline]
    fn apply(&self, q: &mut Q) {
        q.append_loader(Arc::clone(&self.0));
    }
}

#[derive(Clone)]
pub struct AddMapperMod(pub Arc<dyn MapperMod>);

impl AddMapperMod {
    pub fn new(inner: impl MapperMod + 'static) -> Self {
        Self(Arc::new(inner))
    }
}

impl<Q: AppendLoader> Mod<Q> for AddMapperMod {
    #[inline]
    fn apply(&self, q: &mut Q) {
        q.append_mapper_mod(Arc::clone(&self.0));
    }
}

#[derive(Clone)]
pub struct AddHook(pub Arc<dyn QueryHook>);

impl AddHook {
    pub fn new(inner: impl QueryHook + 'static) -> Self {
        Self(Arc::new(inner))
    }
}

impl<Q: AppendHook> Mod<Q> for AddHook {
    #[inline]
    fn apply(&self, q: &mut Q) {
        q.append_hook(Arc::clone(&self.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Target {
        wheres: Vec<Expr>,
        limit: Option<Expr>,
    }

    impl AppendWhere for Target {
        fn append_where(&mut self, cond: Expr) {
            self.wheres.push(cond);
        }
    }

    impl SetLimit for Target {
        fn set_limit(&mut self, limit: Expr) {
            self.limit = Some(limit);
        }
    }

    #[test]
    fn test_tuple_and_vec_mods() {
        let mut t = Target::default();
        (Where::new("a"), vec![Where::new("b"), Where::new("c")], Limit::new(5)).apply(&mut t);
        assert_eq!(t.wheres.len(), 3);
        assert!(t.limit.is_some());
    }

    #[test]
    fn test_applying_twice_accumulates() {
        let mut t = Target::default();
        let m = Where::new("a");
        m.apply(&mut t);
        m.apply(&mut t);
        assert_eq!(t.wheres.len(), 2);
    }

    #[test]
    fn test_option_and_mod_fn() {
        let mut t = Target::default();
        None::<Where>.apply(&mut t);
        Some(Where::new("x")).apply(&mut t);
        mod_fn(|t: &mut Target| t.wheres.clear()).apply(&mut t);
        assert!(t.wheres.is_empty());
    }
}
