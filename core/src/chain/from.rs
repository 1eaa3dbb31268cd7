use compact_str::CompactString;
use paste::paste;

use crate::clause::{FromClause, IndexHint, IndexHintKind, IndexHintScope};
use crate::expr::Expr;
use crate::mods::{AppendIndexHint, Mod, SetTable};

/// Builds a table reference for FROM (or the target of UPDATE).
///
/// Applying sets the table, then its alias, the lateral flag, partitions and
/// index hints, all in a single [`SetTable::set_table`] call.
#[derive(Debug, Clone)]
pub struct FromChain {
    clause: FromClause,
}

macro_rules! index_hint_methods {
    ($($kind:ident),*) => {
        paste! {
            $(
                #[must_use]
                pub fn [<$kind:lower _index>]<I>(&self, indexes: I) -> Self
                where
                    I: IntoIterator,
                    I::Item: Into<CompactString>,
                {
                    self.hint(IndexHintKind::$kind, IndexHintScope::Any, indexes)
                }

                #[must_use]
                pub fn [<$kind:lower _index_for_join>]<I>(&self, indexes: I) -> Self
                where
                    I: IntoIterator,
                    I::Item: Into<CompactString>,
                {
                    self.hint(IndexHintKind::$kind, IndexHintScope::Join, indexes)
                }

                #[must_use]
                pub fn [<$kind:lower _index_for_order_by>]<I>(&self, indexes: I) -> Self
                where
                    I: IntoIterator,
                    I::Item: Into<CompactString>,
                {
                    self.hint(IndexHintKind::$kind, IndexHintScope::OrderBy, indexes)
                }

                #[must_use]
                pub fn [<$kind:lower _index_for_group_by>]<I>(&self, indexes: I) -> Self
                where
                    I: IntoIterator,
                    I::Item: Into<CompactString>,
                {
                    self.hint(IndexHintKind::$kind, IndexHintScope::GroupBy, indexes)
                }
            )*
        }
    };
}

impl FromChain {
    pub fn new(table: impl Into<Expr>) -> Self {
        Self {
            clause: FromClause::new(table),
        }
    }

    fn map(&self, f: impl FnOnce(&mut FromClause)) -> Self {
        let mut clause = self.clause.clone();
        f(&mut clause);
        Self { clause }
    }

    fn hint<I>(&self, kind: IndexHintKind, scope: IndexHintScope, indexes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        let mut hint = IndexHint::new(kind, indexes);
        hint.scope = scope;
        self.map(|c| c.index_hints.push(hint))
    }

    #[must_use]
    pub fn r#as(&self, alias: impl Into<CompactString>) -> Self {
        let alias = alias.into();
        self.map(|c| c.alias = Some(alias))
    }

    /// Column names for the alias: `AS t(a, b)`.
    #[must_use]
    pub fn alias_columns<I>(&self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        let columns: Vec<CompactString> = columns.into_iter().map(Into::into).collect();
        self.map(|c| c.columns = columns)
    }

    #[must_use]
    pub fn lateral(&self) -> Self {
        self.map(|c| c.lateral = true)
    }

    #[must_use]
    pub fn partition<I>(&self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        let names = names.into_iter().map(Into::into);
        self.map(|c| c.partitions.extend(names))
    }

    index_hint_methods!(Use, Ignore, Force);

    pub fn clause(&self) -> &FromClause {
        &self.clause
    }
}

impl<Q: SetTable> Mod<Q> for FromChain {
    fn apply(&self, q: &mut Q) {
        q.set_table(self.clause.clone());
    }
}

impl From<FromChain> for FromClause {
    fn from(chain: FromChain) -> Self {
        chain.clause
    }
}

/// A standalone index hint, appended to the current table reference.
#[derive(Debug, Clone)]
pub struct IndexHintChain {
    hint: IndexHint,
}

impl IndexHintChain {
    pub fn new<I>(kind: IndexHintKind, indexes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        Self {
            hint: IndexHint::new(kind, indexes),
        }
    }

    fn scoped(&self, scope: IndexHintScope) -> Self {
        let mut hint = self.hint.clone();
        hint.scope = scope;
        Self { hint }
    }

    #[must_use]
    pub fn for_join(&self) -> Self {
        self.scoped(IndexHintScope::Join)
    }

    #[must_use]
    pub fn for_order_by(&self) -> Self {
        self.scoped(IndexHintScope::OrderBy)
    }

    #[must_use]
    pub fn for_group_by(&self) -> Self {
        self.scoped(IndexHintScope::GroupBy)
    }
}

impl<Q: AppendIndexHint> Mod<Q> for IndexHintChain {
    fn apply(&self, q: &mut Q) {
        q.append_index_hint(self.hint.clone());
    }
}
