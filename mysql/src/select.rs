use std::sync::Arc;

use compact_str::CompactString;
use mortar_core::clause::{Cte, FromClause, IndexHint, Join, Lock, NamedWindow, OrderDef, With};
use mortar_core::expr::{Expr, Expression, express_and, express_if, express_slice};
use mortar_core::hook::{Hooks, QueryHook};
use mortar_core::load::{Loader, Loaders};
use mortar_core::mods::{
    AppendGroup, AppendHaving, AppendHook, AppendIndexHint, AppendJoin, AppendLoader,
    AppendOrder, AppendPartition, AppendSelect, AppendWhere, AppendWindow, AppendWith, Mod,
    SetDistinct, SetFor, SetLimit, SetOffset, SetTable,
};
use mortar_core::scan::MapperMod;
use mortar_core::{Context, Dialect, Executor, Params, Query, QueryType, Result};

/// A MySQL `SELECT` statement.
///
/// Clauses render in SQL order regardless of the order mods were applied:
///
/// ```text
/// [WITH ...] SELECT [DISTINCT] cols FROM ... [JOIN ...] [WHERE ...]
/// [GROUP BY ... [WITH ROLLUP]] [HAVING ...] [WINDOW ...] [ORDER BY ...]
/// [LIMIT ...] [OFFSET ...] [FOR ...]
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    with: With,
    distinct: bool,
    columns: Vec<Expr>,
    from: FromClause,
    joins: Vec<Join>,
    r#where: Vec<Expr>,
    group_by: Vec<Expr>,
    with_rollup: bool,
    having: Vec<Expr>,
    windows: Vec<NamedWindow>,
    order_by: Vec<OrderDef>,
    limit: Option<Expr>,
    offset: Option<Expr>,
    lock: Option<Lock>,
    loaders: Loaders,
    hooks: Hooks,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a mod and returns the query.
    #[must_use]
    pub fn apply<M: Mod<Self>>(mut self, m: M) -> Self {
        m.apply(&mut self);
        self
    }

    /// Applies a mod in place.
    pub fn apply_mut<M: Mod<Self>>(&mut self, m: M) -> &mut Self {
        m.apply(self);
        self
    }

    pub fn set_with_rollup(&mut self, rollup: bool) {
        self.with_rollup = rollup;
    }
}

impl Expression for SelectQuery {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        let mut params = Params::new();

        if !self.with.is_empty() {
            params.extend(self.with.write_sql(w, d, start)?);
            w.push(' ');
        }

        w.push_str("SELECT ");
        if self.distinct {
            w.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            w.push('*');
        } else {
            params.extend(express_slice(w, d, start + params.len(), &self.columns, "", ", ", "")?);
        }

        if !self.from.is_empty() {
            w.push_str(" FROM ");
            params.extend(self.from.write_sql(w, d, start + params.len())?);
        }
        params.extend(express_slice(w, d, start + params.len(), &self.joins, " ", " ", "")?);

        if !self.r#where.is_empty() {
            w.push_str(" WHERE ");
            params.extend(express_and(w, d, start + params.len(), &self.r#where)?);
        }

        params.extend(express_slice(w, d, start + params.len(), &self.group_by, " GROUP BY ", ", ", "")?);
        if self.with_rollup && !self.group_by.is_empty() {
            w.push_str(" WITH ROLLUP");
        }

        if !self.having.is_empty() {
            w.push_str(" HAVING ");
            params.extend(express_and(w, d, start + params.len(), &self.having)?);
        }

        params.extend(express_slice(w, d, start + params.len(), &self.windows, " WINDOW ", ", ", "")?);
        params.extend(express_slice(w, d, start + params.len(), &self.order_by, " ORDER BY ", ", ", "")?);
        params.extend(express_if(w, d, start + params.len(), self.limit.as_ref(), " LIMIT ", "")?);
        params.extend(express_if(w, d, start + params.len(), self.offset.as_ref(), " OFFSET ", "")?);
        params.extend(express_if(w, d, start + params.len(), self.lock.as_ref(), " ", "")?);

        Ok(params)
    }
}

impl Query for SelectQuery {
    fn dialect(&self) -> Dialect {
        crate::DIALECT
    }

    fn query_type(&self) -> QueryType {
        QueryType::Select
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

// =============================================================================
// Capabilities
// =============================================================================

impl SetTable for SelectQuery {
    fn set_table(&mut self, from: FromClause) {
        self.from.replace(from);
    }
}

impl AppendPartition for SelectQuery {
    fn append_partition(&mut self, name: CompactString) {
        self.from.partitions.push(name);
    }
}

impl AppendIndexHint for SelectQuery {
    fn append_index_hint(&mut self, hint: IndexHint) {
        self.from.index_hints.push(hint);
    }
}

impl AppendJoin for SelectQuery {
    fn append_join(&mut self, join: Join) {
        self.joins.push(join);
    }
}

impl AppendOrder for SelectQuery {
    fn append_order(&mut self, order: OrderDef) {
        self.order_by.push(order);
    }
}

impl AppendWith for SelectQuery {
    fn append_with(&mut self, cte: Cte) {
        self.with.ctes.push(cte);
    }

    fn set_recursive(&mut self, recursive: bool) {
        self.with.recursive = recursive;
    }
}

impl SetFor for SelectQuery {
    fn set_for(&mut self, lock: Lock) {
        self.lock = Some(lock);
    }
}

impl AppendWindow for SelectQuery {
    fn append_window(&mut self, window: NamedWindow) {
        self.windows.push(window);
    }
}

impl AppendWhere for SelectQuery {
    fn append_where(&mut self, cond: Expr) {
        self.r#where.push(cond);
    }
}

impl AppendHaving for SelectQuery {
    fn append_having(&mut self, cond: Expr) {
        self.having.push(cond);
    }
}

impl AppendGroup for SelectQuery {
    fn append_group(&mut self, expr: Expr) {
        self.group_by.push(expr);
    }
}

impl AppendSelect for SelectQuery {
    fn append_select(&mut self, column: Expr) {
        self.columns.push(column);
    }
}

impl SetDistinct for SelectQuery {
    fn set_distinct(&mut self, distinct: bool) {
        self.distinct = distinct;
    }
}

impl SetLimit for SelectQuery {
    fn set_limit(&mut self, limit: Expr) {
        self.limit = Some(limit);
    }
}

impl SetOffset for SelectQuery {
    fn set_offset(&mut self, offset: Expr) {
        self.offset = Some(offset);
    }
}

impl AppendLoader for SelectQuery {
    fn append_loader(&mut self, loader: Arc<dyn Loader>) {
        self.loaders.append_loader(loader);
    }

    fn append_mapper_mod(&mut self, m: Arc<dyn MapperMod>) {
        self.loaders.append_mapper_mod(m);
    }
}

impl AppendHook for SelectQuery {
    fn append_hook(&mut self, hook: Arc<dyn QueryHook>) {
        self.hooks.push(hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arg, select, sm};
    use mortar_core::build;

    #[test]
    fn test_empty_select() {
        assert_eq!(build(&SelectQuery::new()).unwrap().0, "SELECT *");
    }

    #[test]
    fn test_clause_order_ignores_mod_order() {
        let q = select((
            sm::limit(10),
            sm::order_by("id").desc(),
            sm::r#where("a = 1"),
            sm::from("t"),
            sm::columns(["id"]),
        ));
        assert_eq!(
            build(&q).unwrap().0,
            "SELECT id FROM t WHERE a = 1 ORDER BY id DESC LIMIT 10"
        );
    }

    #[test]
    fn test_where_and_having_are_conjunctions() {
        let q = select((
            sm::columns(["dept", "COUNT(*)"]),
            sm::from("emp"),
            sm::r#where("active = 1"),
            sm::r#where("age > 30"),
            sm::group_by("dept"),
            sm::with_rollup(),
            sm::having("COUNT(*) > 1"),
        ));
        assert_eq!(
            build(&q).unwrap().0,
            "SELECT dept, COUNT(*) FROM emp WHERE active = 1 AND age > 30 GROUP BY dept WITH ROLLUP HAVING COUNT(*) > 1"
        );
    }

    #[test]
    fn test_placeholders_number_across_clauses() {
        let q = select((
            sm::from("t"),
            sm::r#where(mortar_core::expr::lit("a").eq(arg([1]))),
            sm::limit(arg([5])),
        ));
        let (text, params) = build(&q).unwrap();
        assert_eq!(text, "SELECT * FROM t WHERE a = ? LIMIT ?");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_lock_is_last() {
        let q = select((
            sm::from("jobs"),
            sm::for_update(["jobs"]).skip_locked(),
            sm::limit(1),
        ));
        assert_eq!(
            build(&q).unwrap().0,
            "SELECT * FROM jobs LIMIT 1 FOR UPDATE OF jobs SKIP LOCKED"
        );
    }

    #[test]
    fn test_rollup_without_group_is_dropped() {
        let q = select((sm::from("t"), sm::with_rollup()));
        assert_eq!(build(&q).unwrap().0, "SELECT * FROM t");
    }
}
