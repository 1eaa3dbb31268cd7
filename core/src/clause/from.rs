use std::mem;

use compact_str::CompactString;

use crate::dialect::Dialect;
use crate::error::{MortarError, Result};
use crate::expr::{Expr, Expression, express_slice, write_names};
use crate::param::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexHintKind {
    Use,
    Ignore,
    Force,
}

impl IndexHintKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IndexHintKind::Use => "USE",
            IndexHintKind::Ignore => "IGNORE",
            IndexHintKind::Force => "FORCE",
        }
    }
}

/// The optional `FOR ...` scope of an index hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexHintScope {
    #[default]
    Any,
    Join,
    OrderBy,
    GroupBy,
}

impl IndexHintScope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IndexHintScope::Any => "",
            IndexHintScope::Join => " FOR JOIN",
            IndexHintScope::OrderBy => " FOR ORDER BY",
            IndexHintScope::GroupBy => " FOR GROUP BY",
        }
    }
}

/// `USE INDEX [FOR JOIN] (a, b)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHint {
    pub kind: IndexHintKind,
    pub scope: IndexHintScope,
    pub indexes: Vec<CompactString>,
}

impl IndexHint {
    pub fn new<I>(kind: IndexHintKind, indexes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        Self {
            kind,
            scope: IndexHintScope::Any,
            indexes: indexes.into_iter().map(Into::into).collect(),
        }
    }
}

impl Expression for IndexHint {
    fn write_sql(&self, w: &mut String, _d: Dialect, _start: usize) -> Result<Params> {
        if self.indexes.is_empty() {
            return Err(MortarError::Render(format!(
                "{} INDEX hint without indexes",
                self.kind.as_str()
            )));
        }
        w.push_str(self.kind.as_str());
        w.push_str(" INDEX");
        w.push_str(self.scope.as_str());
        w.push_str(" (");
        write_names(w, &self.indexes);
        w.push(')');
        Ok(Params::new())
    }
}

/// A table reference:
/// `[LATERAL] table [PARTITION (p, ...)] [AS alias[(cols)]] [index hints]`
#[derive(Debug, Clone, Default)]
pub struct FromClause {
    pub table: Option<Expr>,
    pub alias: Option<CompactString>,
    pub columns: Vec<CompactString>,
    pub lateral: bool,
    pub partitions: Vec<CompactString>,
    pub index_hints: Vec<IndexHint>,
}

impl FromClause {
    pub fn new(table: impl Into<Expr>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    /// Whether nothing has been set on this clause.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_none() && self.partitions.is_empty() && self.index_hints.is_empty()
    }

    /// Replaces the table reference, alias and column list with `next`'s.
    ///
    /// Partitions and index hints accumulate: those already attached are kept
    /// ahead of the ones `next` carries.
    pub fn replace(&mut self, mut next: FromClause) {
        let mut partitions = mem::take(&mut self.partitions);
        partitions.append(&mut next.partitions);
        next.partitions = partitions;

        let mut hints = mem::take(&mut self.index_hints);
        hints.append(&mut next.index_hints);
        next.index_hints = hints;

        *self = next;
    }
}

impl Expression for FromClause {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        let Some(table) = &self.table else {
            return Err(MortarError::Render("table reference without a table".into()));
        };

        if self.lateral {
            w.push_str("LATERAL ");
        }
        let mut params = table.write_sql(w, d, start)?;

        if !self.partitions.is_empty() {
            w.push_str(" PARTITION (");
            write_names(w, &self.partitions);
            w.push(')');
        }

        if let Some(alias) = &self.alias {
            w.push_str(" AS ");
            w.push_str(alias);
            if !self.columns.is_empty() {
                w.push('(');
                write_names(w, &self.columns);
                w.push(')');
            }
        }

        params.extend(express_slice(
            w,
            d,
            start + params.len(),
            &self.index_hints,
            " ",
            " ",
            "",
        )?);
        Ok(params)
    }
}
