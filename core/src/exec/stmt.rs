use core::fmt;
use core::marker::PhantomData;
use std::any::Any;
use std::sync::Arc;

use crate::QueryType;
use crate::context::Context;
use crate::error::{MortarError, Partial, Result};
use crate::exec::{Cursor, ExecResult, Preparer, Statement, finish_all, finish_one};
use crate::hook::{Collection, Hookable};
use crate::load::{Loader, run_loaders};
use crate::param::{Param, Params, bind_all};
use crate::query::{Query, build};
use crate::scan::{Mapper, all_from_rows, one_from_rows, with_mapper_mods};
use crate::value::Value;
use crate::{mortar_trace_query, mortar_trace_stmt};

/// A prepared statement with a fixed argument count.
///
/// Every execution must supply exactly as many arguments as the query
/// rendered, in the order they were rendered.
pub struct Stmt<'e, E: Preparer + 'e> {
    inner: E::Prepared<'e>,
    exec: &'e E,
    params: Params,
    query_type: QueryType,
    loaders: Vec<Arc<dyn Loader>>,
}

/// Runs the query's hooks, renders it and prepares the SQL.
///
/// Loaders declared on the query are captured into the statement.
pub fn prepare<'e, E, Q>(ctx: &Context, exec: &'e E, q: &Q) -> Result<Stmt<'e, E>>
where
    E: Preparer,
    Q: Query + ?Sized,
{
    let ctx = q.run_hooks(ctx.clone(), exec)?;
    let (sql, params) = build(q)?;
    ctx.check()?;
    mortar_trace_query!(&sql, params.len());
    let inner = exec.prepare(&ctx, &sql)?;
    Ok(Stmt {
        inner,
        exec,
        params,
        query_type: q.query_type(),
        loaders: q.loaders().to_vec(),
    })
}

impl<'e, E: Preparer + 'e> Stmt<'e, E> {
    /// Number of arguments each execution takes.
    #[must_use]
    pub fn len_args(&self) -> usize {
        self.params.len()
    }

    /// Arguments as rendered; placeholders are unbound.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// The rendered arguments, for queries without unbound placeholders.
    pub fn bound_args(&self) -> Result<Vec<Value>> {
        bind_all(&self.params)
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    fn check_args(&self, args: &[Value]) -> Result<()> {
        if args.len() != self.params.len() {
            return Err(MortarError::ArgumentCount {
                expected: self.params.len(),
                got: args.len(),
            });
        }
        Ok(())
    }

    /// Executes for side effects, then runs the captured loaders with
    /// nothing retrieved. A loader failure discards the result.
    pub fn exec(&self, ctx: &Context, args: &[Value]) -> Result<ExecResult> {
        self.check_args(args)?;
        ctx.check()?;
        mortar_trace_stmt!("exec", self.query_type);
        let res = self.inner.exec(ctx, args)?;
        run_loaders(ctx, self.exec, &self.loaders, None)?;
        Ok(res)
    }
}

impl<E: Preparer> fmt::Debug for Stmt<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stmt")
            .field("len_args", &self.params.len())
            .field("query_type", &self.query_type)
            .field("loaders", &self.loaders.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Typed retrieval
// =============================================================================

/// A prepared statement that maps rows to `T` and collects into `Ts`.
pub struct QueryStmt<'e, E: Preparer + 'e, T, Ts = Vec<T>> {
    stmt: Stmt<'e, E>,
    mapper: Arc<dyn Mapper<T>>,
    _collection: PhantomData<fn() -> Ts>,
}

/// Prepares a query whose rows are decoded by `mapper`.
///
/// Mapper mods declared on the query wrap the mapper.
pub fn prepare_query<'e, T, E, Q, M>(
    ctx: &Context,
    exec: &'e E,
    q: &Q,
    mapper: M,
) -> Result<QueryStmt<'e, E, T>>
where
    T: Hookable + Any,
    E: Preparer,
    Q: Query + ?Sized,
    M: Mapper<T> + 'static,
{
    let stmt = prepare(ctx, exec, q)?;
    Ok(QueryStmt {
        stmt,
        mapper: with_mapper_mods(Arc::new(mapper), q.mapper_mods()),
        _collection: PhantomData,
    })
}

impl<'e, E, T, Ts> QueryStmt<'e, E, T, Ts>
where
    E: Preparer + 'e,
    T: Hookable + Any,
    Ts: Collection<T> + Any,
{
    /// Collects [`all`](Self::all) into another collection type.
    pub fn collect_into<Ts2: Collection<T> + Any>(self) -> QueryStmt<'e, E, T, Ts2> {
        QueryStmt {
            stmt: self.stmt,
            mapper: self.mapper,
            _collection: PhantomData,
        }
    }

    pub fn stmt(&self) -> &Stmt<'e, E> {
        &self.stmt
    }

    /// Executes for side effects.
    pub fn exec(&self, ctx: &Context, args: &[Value]) -> Result<ExecResult> {
        self.stmt.exec(ctx, args)
    }

    /// Scans the first row, runs loaders on it, then its after-query hook.
    pub fn one(&self, ctx: &Context, args: &[Value]) -> Result<T, Partial<T>> {
        self.stmt.check_args(args)?;
        ctx.check()?;
        let value = {
            let mut rows = self.stmt.inner.query(ctx, args)?;
            one_from_rows(ctx, &mut *rows, &*self.mapper)?
        };
        finish_one(ctx, self.stmt.exec, &self.stmt.loaders, self.stmt.query_type, value)
    }

    /// Scans every row and runs loaders once on the whole collection.
    ///
    /// The after-query hook runs on the collection when `Ts` declares one,
    /// otherwise on each element.
    pub fn all(&self, ctx: &Context, args: &[Value]) -> Result<Ts, Partial<Ts>> {
        self.stmt.check_args(args)?;
        ctx.check()?;
        let values = {
            let mut rows = self.stmt.inner.query(ctx, args)?;
            all_from_rows(ctx, &mut *rows, &*self.mapper)?
        };
        finish_all(ctx, self.stmt.exec, &self.stmt.loaders, self.stmt.query_type, values)
    }

    /// Streams rows; loaders and the hook run per item as it is pulled.
    pub fn cursor(&self, ctx: &Context, args: &[Value]) -> Result<Cursor<'_, T>> {
        self.stmt.check_args(args)?;
        ctx.check()?;
        let rows = self.stmt.inner.query(ctx, args)?;
        Cursor::new(
            ctx.clone(),
            self.stmt.exec,
            rows,
            &*self.mapper,
            &self.stmt.loaders,
            self.stmt.query_type,
        )
    }
}

impl<E: Preparer, T, Ts> fmt::Debug for QueryStmt<'_, E, T, Ts> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryStmt")
            .field("stmt", &self.stmt)
            .finish_non_exhaustive()
    }
}
