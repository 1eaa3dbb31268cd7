use std::sync::Arc;

use compact_str::CompactString;

use crate::dialect::Dialect;
use crate::error::{MortarError, Result};
use crate::expr::{Expression, express_slice, write_names};
use crate::param::Params;

/// A common table expression: `name[(cols)] AS (query)`
///
/// A CTE without a query is rejected at render time. Name uniqueness within
/// one WITH clause is left to the database.
#[derive(Debug, Clone, Default)]
pub struct Cte {
    pub name: CompactString,
    pub columns: Vec<CompactString>,
    pub query: Option<Arc<dyn Expression>>,
}

impl Expression for Cte {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        let Some(query) = &self.query else {
            return Err(MortarError::Render(format!(
                "CTE {} has no defining query",
                self.name
            )));
        };
        w.push_str(&self.name);
        if !self.columns.is_empty() {
            w.push('(');
            write_names(w, &self.columns);
            w.push(')');
        }
        w.push_str(" AS (");
        let params = query.write_sql(w, d, start)?;
        w.push(')');
        Ok(params)
    }
}

/// `WITH [RECURSIVE] cte, ...`; renders nothing without CTEs
#[derive(Debug, Clone, Default)]
pub struct With {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
}

impl With {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ctes.is_empty()
    }
}

impl Expression for With {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        let prefix = if self.recursive {
            "WITH RECURSIVE "
        } else {
            "WITH "
        };
        express_slice(w, d, start, &self.ctes, prefix, ", ", "")
    }
}
