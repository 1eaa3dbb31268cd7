//! Statement execution.
//!
//! Every retrieval runs in the same order: pre-query hooks, render, execute,
//! scan, loaders in declaration order, then the result type's after-query
//! hook. The context is checked before each of those steps that can block.

mod cursor;
mod stmt;

pub use cursor::Cursor;
pub use stmt::{QueryStmt, Stmt, prepare, prepare_query};

use std::any::Any;
use std::sync::Arc;

use crate::QueryType;
use crate::context::Context;
use crate::error::{Partial, Result};
use crate::hook::{Collection, Hookable, after_query_all, after_query_one};
use crate::load::{Loader, run_loaders};
use crate::param::bind_all;
use crate::query::{Query, build};
use crate::scan::{Mapper, Rows, all_from_rows, one_from_rows, with_mapper_mods};
use crate::value::Value;
use crate::{mortar_trace_query, mortar_trace_stmt};

// =============================================================================
// Collaborator traits
// =============================================================================

/// Outcome of a statement run for its side effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// Runs SQL text against a database.
pub trait Executor {
    fn exec(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<ExecResult>;
    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn exec(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<ExecResult> {
        (**self).exec(ctx, sql, args)
    }

    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        (**self).query(ctx, sql, args)
    }
}

/// A prepared statement handle.
pub trait Statement {
    fn exec(&self, ctx: &Context, args: &[Value]) -> Result<ExecResult>;
    fn query(&self, ctx: &Context, args: &[Value]) -> Result<Box<dyn Rows + '_>>;
}

/// An executor that can prepare statements.
pub trait Preparer: Executor {
    type Prepared<'s>: Statement
    where
        Self: 's;

    fn prepare<'s>(&'s self, ctx: &Context, sql: &str) -> Result<Self::Prepared<'s>>;
}

// =============================================================================
// Direct execution
// =============================================================================

fn render<Q: Query + ?Sized>(ctx: &Context, exec: &dyn Executor, q: &Q) -> Result<(Context, String, Vec<Value>)> {
    let ctx = q.run_hooks(ctx.clone(), exec)?;
    let (sql, params) = build(q)?;
    let args = bind_all(&params)?;
    ctx.check()?;
    mortar_trace_query!(&sql, args.len());
    Ok((ctx, sql, args))
}

/// Executes a query for its side effects, then runs its loaders with
/// nothing retrieved.
pub fn exec<E, Q>(ctx: &Context, exec: &E, q: &Q) -> Result<ExecResult>
where
    E: Executor,
    Q: Query + ?Sized,
{
    let (ctx, sql, args) = render(ctx, exec, q)?;
    let res = exec.exec(&ctx, &sql, &args)?;
    run_loaders(&ctx, exec, q.loaders(), None)?;
    Ok(res)
}

/// Executes a query and scans its first row.
pub fn one<T, E, Q, M>(ctx: &Context, exec: &E, q: &Q, mapper: M) -> Result<T, Partial<T>>
where
    T: Hookable + Any,
    E: Executor,
    Q: Query + ?Sized,
    M: Mapper<T> + 'static,
{
    let (ctx, sql, args) = render(ctx, exec, q)?;
    let mapper = with_mapper_mods(Arc::new(mapper), q.mapper_mods());
    let value = {
        let mut rows = exec.query(&ctx, &sql, &args)?;
        one_from_rows(&ctx, &mut *rows, &*mapper)?
    };
    finish_one(&ctx, exec, q.loaders(), q.query_type(), value)
}

/// Executes a query and scans every row into a `Vec<T>`.
pub fn all<T, E, Q, M>(ctx: &Context, exec: &E, q: &Q, mapper: M) -> Result<Vec<T>, Partial<Vec<T>>>
where
    T: Hookable + Any,
    E: Executor,
    Q: Query + ?Sized,
    M: Mapper<T> + 'static,
{
    let (ctx, sql, args) = render(ctx, exec, q)?;
    let mapper = with_mapper_mods(Arc::new(mapper), q.mapper_mods());
    let values = {
        let mut rows = exec.query(&ctx, &sql, &args)?;
        all_from_rows(&ctx, &mut *rows, &*mapper)?
    };
    finish_all(&ctx, exec, q.loaders(), q.query_type(), values)
}

/// Executes a query and returns a lazy cursor over its rows.
pub fn cursor<'a, T, E, Q, M>(ctx: &Context, exec: &'a E, q: &'a Q, mapper: M) -> Result<Cursor<'a, T>>
where
    T: Hookable + Any,
    E: Executor,
    Q: Query + ?Sized,
    M: Mapper<T> + 'static,
{
    let (ctx, sql, args) = render(ctx, exec, q)?;
    let mapper = with_mapper_mods(Arc::new(mapper), q.mapper_mods());
    let rows = exec.query(&ctx, &sql, &args)?;
    Cursor::new(ctx, exec, rows, &*mapper, q.loaders(), q.query_type())
}

// =============================================================================
// After the scan
// =============================================================================

pub(crate) fn finish_one<T: Hookable + Any>(
    ctx: &Context,
    exec: &dyn Executor,
    loaders: &[Arc<dyn Loader>],
    query_type: QueryType,
    mut value: T,
) -> Result<T, Partial<T>> {
    mortar_trace_stmt!("one", query_type);
    if let Err(e) = run_loaders(ctx, exec, loaders, Some(&mut value as &mut dyn Any)) {
        return Err(Partial::new(e, Some(value)));
    }
    if let Err(e) = after_query_one(&mut value, ctx, exec, query_type) {
        return Err(Partial::new(e, Some(value)));
    }
    Ok(value)
}

pub(crate) fn finish_all<T, Ts>(
    ctx: &Context,
    exec: &dyn Executor,
    loaders: &[Arc<dyn Loader>],
    query_type: QueryType,
    mut values: Vec<T>,
) -> Result<Ts, Partial<Ts>>
where
    T: Hookable + Any,
    Ts: Collection<T> + Any,
{
    mortar_trace_stmt!("all", query_type);
    // Loaders get the scanned `Vec<T>`, before it becomes a `Ts`.
    if let Err(e) = run_loaders(ctx, exec, loaders, Some(&mut values as &mut dyn Any)) {
        return Err(Partial::new(e, Some(Ts::from_vec(values))));
    }
    let mut values = Ts::from_vec(values);
    if let Err(e) = after_query_all(&mut values, ctx, exec, query_type) {
        return Err(Partial::new(e, Some(values)));
    }
    Ok(values)
}
