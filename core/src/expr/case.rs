//! Searched CASE expressions.
//!
//! # Example
//!
//! ```
//! use mortar_core::expr::{case, render};
//! use mortar_core::Dialect;
//!
//! let e = case()
//!     .when("age > 65", "'Senior'")
//!     .when("age > 18", "'Adult'")
//!     .r#else("'Minor'");
//! assert_eq!(
//!     render(&e, Dialect::MySQL, 1).unwrap().0,
//!     "CASE WHEN age > 65 THEN 'Senior' WHEN age > 18 THEN 'Adult' ELSE 'Minor' END"
//! );
//! ```

use super::{Expr, Expression};
use crate::dialect::Dialect;
use crate::error::{MortarError, Result};
use crate::param::Params;

/// A CASE expression: WHEN/THEN pairs in insertion order and an optional ELSE
#[derive(Debug, Clone, Default)]
pub struct CaseExpr {
    whens: Vec<(Expr, Expr)>,
    r#else: Option<Expr>,
}

impl Expression for CaseExpr {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        if self.whens.is_empty() {
            return Err(MortarError::Render("CASE without WHEN".into()));
        }
        w.push_str("CASE");
        let mut params = Params::new();
        for (cond, then) in &self.whens {
            w.push_str(" WHEN ");
            params.extend(cond.write_sql(w, d, start + params.len())?);
            w.push_str(" THEN ");
            params.extend(then.write_sql(w, d, start + params.len())?);
        }
        if let Some(e) = &self.r#else {
            w.push_str(" ELSE ");
            params.extend(e.write_sql(w, d, start + params.len())?);
        }
        w.push_str(" END");
        Ok(params)
    }
}

/// Immutable CASE builder; every method returns a new chain.
#[derive(Debug, Clone, Default)]
pub struct CaseChain {
    case: CaseExpr,
}

pub fn case() -> CaseChain {
    CaseChain::default()
}

impl CaseChain {
    #[must_use]
    pub fn when(&self, condition: impl Into<Expr>, then: impl Into<Expr>) -> Self {
        let mut case = self.case.clone();
        case.whens.push((condition.into(), then.into()));
        Self { case }
    }

    /// Finishes the expression with an ELSE branch.
    pub fn r#else(&self, then: impl Into<Expr>) -> Expr {
        let mut case = self.case.clone();
        case.r#else = Some(then.into());
        Expr::Case(Box::new(case))
    }

    /// Finishes the expression without ELSE; unmatched rows yield `NULL`.
    pub fn end(&self) -> Expr {
        Expr::Case(Box::new(self.case.clone()))
    }
}

impl Expression for CaseChain {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        self.case.write_sql(w, d, start)
    }
}

impl From<CaseChain> for Expr {
    fn from(c: CaseChain) -> Self {
        Expr::Case(Box::new(c.case))
    }
}
