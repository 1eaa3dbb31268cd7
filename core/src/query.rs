//! The query contract consumed by the execution pipeline.

use std::sync::Arc;

use compact_str::CompactString;

use crate::QueryType;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::exec::Executor;
use crate::expr::{self, Expr, Expression};
use crate::hook::{Hooks, QueryHook};
use crate::load::{Loader, Loaders};
use crate::mods::{AppendHook, AppendLoader, Mod};
use crate::param::Params;
use crate::scan::MapperMod;
use crate::value::Value;

/// A complete statement that can be prepared and executed.
///
/// Everything beyond [`dialect`](Query::dialect) is optional: the defaults
/// declare no loaders, no mapper mods and no pre-query hooks.
pub trait Query: Expression {
    fn dialect(&self) -> Dialect;

    /// Tag handed to after-query hooks.
    fn query_type(&self) -> QueryType {
        QueryType::Unknown
    }

    fn loaders(&self) -> &[Arc<dyn Loader>] {
        &[]
    }

    fn mapper_mods(&self) -> &[Arc<dyn MapperMod>] {
        &[]
    }

    /// Runs before the query is rendered and may enrich the context.
    fn run_hooks(&self, ctx: Context, _exec: &dyn Executor) -> Result<Context> {
        Ok(ctx)
    }
}

impl<Q: Query + ?Sized> Query for &Q {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn query_type(&self) -> QueryType {
        (**self).query_type()
    }

    fn loaders(&self) -> &[Arc<dyn Loader>] {
        (**self).loaders()
    }

    fn mapper_mods(&self) -> &[Arc<dyn MapperMod>] {
        (**self).mapper_mods()
    }

    fn run_hooks(&self, ctx: Context, exec: &dyn Executor) -> Result<Context> {
        (**self).run_hooks(ctx, exec)
    }
}

/// Renders a query in its own dialect, numbering placeholders from 1.
#[inline]
pub fn build<Q: Query + ?Sized>(q: &Q) -> Result<(String, Params)> {
    expr::render(q, q.dialect(), 1)
}

/// A query over hand-written SQL, where each `?` is an argument.
#[derive(Debug, Clone)]
pub struct RawQuery {
    dialect: Dialect,
    query_type: QueryType,
    expr: Expr,
    loaders: Loaders,
    hooks: Hooks,
}

/// Starts a [`RawQuery`].
pub fn raw_query<I>(dialect: Dialect, sql: impl Into<CompactString>, args: I) -> RawQuery
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    RawQuery {
        dialect,
        query_type: QueryType::Unknown,
        expr: expr::raw(sql, args),
        loaders: Loaders::default(),
        hooks: Hooks::default(),
    }
}

impl RawQuery {
    #[must_use]
    pub fn with_query_type(mut self, query_type: QueryType) -> Self {
        self.query_type = query_type;
        self
    }

    #[must_use]
    pub fn apply<M: Mod<Self>>(mut self, m: M) -> Self {
        m.apply(&mut self);
        self
    }
}

impl Expression for RawQuery {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        self.expr.write_sql(w, d, start)
    }
}

impl Query for RawQuery {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn query_type(&self) -> QueryType {
        self.query_type
    }

    fn loaders(&self) -> &[Arc<dyn Loader>] {
        self.loaders.loaders()
    }

    fn mapper_mods(&self) -> &[Arc<dyn MapperMod>] {
        self.loaders.mapper_mods()
    }

    fn run_hooks(&self, ctx: Context, exec: &dyn Executor) -> Result<Context> {
        self.hooks.run(ctx, exec)
    }
}

impl AppendLoader for RawQuery {
    fn append_loader(&mut self, loader: Arc<dyn Loader>) {
        self.loaders.append_loader(loader);
    }

    fn append_mapper_mod(&mut self, m: Arc<dyn MapperMod>) {
        self.loaders.append_mapper_mod(m);
    }
}

impl AppendHook for RawQuery {
    fn append_hook(&mut self, hook: Arc<dyn QueryHook>) {
        self.hooks.push(hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MortarError;

    #[test]
    fn test_build_numbers_from_one() {
        let q = raw_query(Dialect::PostgreSQL, "SELECT * FROM t WHERE a = ? AND b = ?", [1, 2]);
        let (sql, params) = build(&q).unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = $1 AND b = $2");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_raw_arity_mismatch_fails() {
        let q = raw_query(Dialect::MySQL, "SELECT ?", Vec::<Value>::new());
        assert!(matches!(build(&q), Err(MortarError::Render(_))));
    }

    #[test]
    fn test_defaults() {
        let q = raw_query(Dialect::SQLite, "SELECT 1", Vec::<Value>::new());
        assert_eq!(q.query_type(), QueryType::Unknown);
        assert!(q.loaders().is_empty());
        assert_eq!(
            q.with_query_type(QueryType::Select).query_type(),
            QueryType::Select
        );
    }
}
