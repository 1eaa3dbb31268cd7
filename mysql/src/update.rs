//! MySQL `UPDATE`.
//!
//! An update has no WINDOW clause, so window mods do not apply to it:
//!
//! ```compile_fail
//! use mortar_mysql::{sm, update};
//!
//! let q = update(sm::window("w").order_by("id"));
//! ```

use std::sync::Arc;

use compact_str::CompactString;
use mortar_core::clause::{Cte, FromClause, IndexHint, Join, OrderDef, With};
use mortar_core::expr::{Expr, Expression, express_and, express_if, express_slice};
use mortar_core::hook::{Hooks, QueryHook};
use mortar_core::load::{Loader, Loaders};
use mortar_core::mods::{
    AppendHook, AppendIndexHint, AppendJoin, AppendLoader, AppendOrder, AppendPartition,
    AppendWhere, AppendWith, Mod, SetLimit, SetTable,
};
use mortar_core::scan::MapperMod;
use mortar_core::{Context, Dialect, Executor, MortarError, Params, Query, QueryType, Result};

/// One `column = value` assignment
#[derive(Debug, Clone)]
pub struct Set {
    pub column: Expr,
    pub value: Expr,
}

impl Expression for Set {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        let mut params = self.column.write_sql(w, d, start)?;
        w.push_str(" = ");
        params.extend(self.value.write_sql(w, d, start + params.len())?);
        Ok(params)
    }
}

/// Query types with a SET list.
pub trait AppendSet {
    fn append_set(&mut self, set: Set);
}

impl<Q: AppendSet> Mod<Q> for Set {
    fn apply(&self, q: &mut Q) {
        q.append_set(self.clone());
    }
}

/// A MySQL `UPDATE` statement:
/// `[WITH ...] UPDATE [LOW_PRIORITY] [IGNORE] table [JOIN ...] SET ...
/// [WHERE ...] [ORDER BY ...] [LIMIT ...]`
#[derive(Debug, Clone, Default)]
pub struct UpdateQuery {
    with: With,
    low_priority: bool,
    ignore: bool,
    table: FromClause,
    joins: Vec<Join>,
    set: Vec<Set>,
    r#where: Vec<Expr>,
    order_by: Vec<OrderDef>,
    limit: Option<Expr>,
    loaders: Loaders,
    hooks: Hooks,
}

impl UpdateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn apply<M: Mod<Self>>(mut self, m: M) -> Self {
        m.apply(&mut self);
        self
    }

    pub fn apply_mut<M: Mod<Self>>(&mut self, m: M) -> &mut Self {
        m.apply(self);
        self
    }

    pub fn set_low_priority(&mut self, low_priority: bool) {
        self.low_priority = low_priority;
    }

    pub fn set_ignore(&mut self, ignore: bool) {
        self.ignore = ignore;
    }
}

impl Expression for UpdateQuery {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        if self.set.is_empty() {
            return Err(MortarError::Render("UPDATE without SET".into()));
        }

        let mut params = Params::new();
        if !self.with.is_empty() {
            params.extend(self.with.write_sql(w, d, start)?);
            w.push(' ');
        }

        w.push_str("UPDATE ");
        if self.low_priority {
            w.push_str("LOW_PRIORITY ");
        }
        if self.ignore {
            w.push_str("IGNORE ");
        }
        params.extend(self.table.write_sql(w, d, start + params.len())?);
        params.extend(express_slice(w, d, start + params.len(), &self.joins, " ", " ", "")?);
        params.extend(express_slice(w, d, start + params.len(), &self.set, " SET ", ", ", "")?);

        if !self.r#where.is_empty() {
            w.push_str(" WHERE ");
            params.extend(express_and(w, d, start + params.len(), &self.r#where)?);
        }

        params.extend(express_slice(w, d, start + params.len(), &self.order_by, " ORDER BY ", ", ", "")?);
        params.extend(express_if(w, d, start + params.len(), self.limit.as_ref(), " LIMIT ", "")?);
        Ok(params)
    }
}

impl Query for UpdateQuery {
    fn dialect(&self) -> Dialect {
        crate::DIALECT
    }

    fn query_type(&self) -> QueryType {
        QueryType::Update
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

impl SetTable for UpdateQuery {
    fn set_table(&mut self, from: FromClause) {
        self.table.replace(from);
    }
}

impl AppendPartition for UpdateQuery {
    fn append_partition(&mut self, name: CompactString) {
        self.table.partitions.push(name);
    }
}

impl AppendIndexHint for UpdateQuery {
    fn append_index_hint(&mut self, hint: IndexHint) {
        self.table.index_hints.push(hint);
    }
}

impl AppendJoin for UpdateQuery {
    fn append_join(&mut self, join: Join) {
        self.joins.push(join);
    }
}

impl AppendSet for UpdateQuery {
    fn append_set(&mut self, set: Set) {
        self.set.push(set);
    }
}

impl AppendWhere for UpdateQuery {
    fn append_where(&mut self, cond: Expr) {
        self.r#where.push(cond);
    }
}

impl AppendOrder for UpdateQuery {
    fn append_order(&mut self, order: OrderDef) {
        self.order_by.push(order);
    }
}

impl AppendWith for UpdateQuery {
    fn append_with(&mut self, cte: Cte) {
        self.with.ctes.push(cte);
    }

    fn set_recursive(&mut self, recursive: bool) {
        self.with.recursive = recursive;
    }
}

impl SetLimit for UpdateQuery {
    fn set_limit(&mut self, limit: Expr) {
        self.limit = Some(limit);
    }
}

impl AppendLoader for UpdateQuery {
    fn append_loader(&mut self, loader: Arc<dyn Loader>) {
        self.loaders.append_loader(loader);
    }

    fn append_mapper_mod(&mut self, m: Arc<dyn MapperMod>) {
        self.loaders.append_mapper_mod(m);
    }
}

impl AppendHook for UpdateQuery {
    fn append_hook(&mut self, hook: Arc<dyn QueryHook>) {
        self.hooks.push(hook);
    }
}
