use std::sync::Arc;

use compact_str::CompactString;

use crate::clause::Cte;
use crate::expr::Expression;
use crate::mods::{AppendWith, Mod};

/// A CTE under construction: `name[(cols)] AS (query)`.
///
/// Applying a chain that never received [`r#as`](Self::r#as) still appends
/// the CTE; rendering the query then fails with a render error.
#[derive(Debug, Clone)]
pub struct CteChain {
    cte: Cte,
}

impl CteChain {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            cte: Cte {
                name: name.into(),
                ..Cte::default()
            },
        }
    }

    #[must_use]
    pub fn columns<I>(&self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        let mut cte = self.cte.clone();
        cte.columns = columns.into_iter().map(Into::into).collect();
        Self { cte }
    }

    /// Attaches the defining query.
    #[must_use]
    pub fn r#as(&self, query: impl Expression + 'static) -> Self {
        let mut cte = self.cte.clone();
        cte.query = Some(Arc::new(query));
        Self { cte }
    }
}

impl<Q: AppendWith> Mod<Q> for CteChain {
    fn apply(&self, q: &mut Q) {
        q.append_with(self.cte.clone());
    }
}
