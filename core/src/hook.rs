//! Lifecycle hooks.
//!
//! Query-level hooks ([`QueryHook`]) run before a query is rendered and may
//! enrich the context. Result-level hooks are declared per type through
//! [`Hookable::AFTER_QUERY`] and run after loaders. The capability is resolved
//! once per type, so a type without a hook costs nothing at execution time.

use core::fmt;
use std::sync::Arc;

use compact_str::CompactString;

use crate::context::Context;
use crate::error::{HookStage, MortarError, Result};
use crate::exec::Executor;
use crate::value::Value;
use crate::{QueryType, mortar_trace_hook};

// =============================================================================
// Before-query hooks
// =============================================================================

pub trait QueryHook: Send + Sync {
    fn run(&self, ctx: Context, exec: &dyn Executor) -> Result<Context>;
}

/// A query hook from a closure.
pub struct HookFn<F>(F);

pub fn hook_fn<F>(f: F) -> HookFn<F>
where
    F: Fn(Context, &dyn Executor) -> Result<Context> + Send + Sync,
{
    HookFn(f)
}

impl<F> QueryHook for HookFn<F>
where
    F: Fn(Context, &dyn Executor) -> Result<Context> + Send + Sync,
{
    fn run(&self, ctx: Context, exec: &dyn Executor) -> Result<Context> {
        (self.0)(ctx, exec)
    }
}

/// Ordered list of query hooks carried by a query
#[derive(Clone, Default)]
pub struct Hooks(Vec<Arc<dyn QueryHook>>);

impl Hooks {
    pub fn push(&mut self, hook: Arc<dyn QueryHook>) {
        self.0.push(hook);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Runs every hook in insertion order, threading the context through.
    pub fn run(&self, mut ctx: Context, exec: &dyn Executor) -> Result<Context> {
        for hook in &self.0 {
            ctx.check()?;
            mortar_trace_hook!(HookStage::BeforeQuery);
            ctx = hook
                .run(ctx, exec)
                .map_err(|e| MortarError::hook(HookStage::BeforeQuery, e))?;
        }
        Ok(ctx)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hooks").field(&self.0.len()).finish()
    }
}

// =============================================================================
// After-query hooks
// =============================================================================

pub type AfterQueryFn<T> = fn(&mut T, &Context, &dyn Executor, QueryType) -> Result<()>;

/// Whether a result type has an after-query hook
pub enum AfterQuery<T> {
    None,
    Hook(AfterQueryFn<T>),
}

/// Result types that may declare an after-query hook.
///
/// ```
/// use mortar_core::hook::{AfterQuery, Hookable};
/// use mortar_core::{Context, Executor, QueryType, Result};
///
/// struct User {
///     name: String,
///     greeted: bool,
/// }
///
/// fn greet(u: &mut User, _: &Context, _: &dyn Executor, _: QueryType) -> Result<()> {
///     u.greeted = !u.name.is_empty();
///     Ok(())
/// }
///
/// impl Hookable for User {
///     const AFTER_QUERY: AfterQuery<Self> = AfterQuery::Hook(greet);
/// }
/// ```
pub trait Hookable: Sized {
    const AFTER_QUERY: AfterQuery<Self> = AfterQuery::None;
}

/// A container returned by `all`.
///
/// When the collection declares no hook of its own, element hooks run once
/// per element instead.
pub trait Collection<T>: Hookable {
    fn from_vec(items: Vec<T>) -> Self;
    fn items_mut(&mut self) -> &mut [T];
}

impl<T: Hookable> Hookable for Vec<T> {}

impl<T: Hookable> Collection<T> for Vec<T> {
    #[inline]
    fn from_vec(items: Vec<T>) -> Self {
        items
    }

    #[inline]
    fn items_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

/// Declares types as [`Hookable`] without an after-query hook.
#[macro_export]
macro_rules! no_hooks {
    ($($ty:ty),* $(,)?) => {
        $(impl $crate::hook::Hookable for $ty {})*
    };
}

no_hooks!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    bool,
    String,
    CompactString,
    Value,
    crate::scan::Row,
);

impl<T: Hookable> Hookable for Option<T> {}

macro_rules! impl_hookable_tuple {
    ($($name:ident),+) => {
        impl<$($name),+> Hookable for ($($name,)+) {}
    };
}

impl_hookable_tuple!(A);
impl_hookable_tuple!(A, B);
impl_hookable_tuple!(A, B, C);
impl_hookable_tuple!(A, B, C, D);
impl_hookable_tuple!(A, B, C, D, E);
impl_hookable_tuple!(A, B, C, D, E, F);

pub(crate) fn after_query_one<T: Hookable>(
    value: &mut T,
    ctx: &Context,
    exec: &dyn Executor,
    query_type: QueryType,
) -> Result<()> {
    match T::AFTER_QUERY {
        AfterQuery::Hook(hook) => {
            ctx.check()?;
            mortar_trace_hook!(HookStage::AfterQuery);
            hook(value, ctx, exec, query_type).map_err(|e| MortarError::hook(HookStage::AfterQuery, e))
        }
        AfterQuery::None => Ok(()),
    }
}

pub(crate) fn after_query_all<T: Hookable, Ts: Collection<T>>(
    values: &mut Ts,
    ctx: &Context,
    exec: &dyn Executor,
    query_type: QueryType,
) -> Result<()> {
    match Ts::AFTER_QUERY {
        AfterQuery::Hook(_) => after_query_one(values, ctx, exec, query_type),
        AfterQuery::None => {
            if let AfterQuery::Hook(_) = T::AFTER_QUERY {
                for item in values.items_mut() {
                    after_query_one(item, ctx, exec, query_type)?;
                }
            }
            Ok(())
        }
    }
}
