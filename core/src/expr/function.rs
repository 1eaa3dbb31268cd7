use compact_str::CompactString;

use super::{Expr, Expression, Logic, express_slice, write_logical};
use crate::clause::WindowDef;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::param::Params;

#[derive(Debug, Clone)]
enum Over {
    Named(CompactString),
    Def(WindowDef),
}

/// A function call: `name([DISTINCT] args) [FILTER (WHERE ...)] [OVER ...]`
#[derive(Debug, Clone)]
pub struct Function {
    name: CompactString,
    args: Vec<Expr>,
    distinct: bool,
    filter: Vec<Expr>,
    over: Option<Over>,
}

/// Creates a function call expression.
///
/// ```
/// use mortar_core::expr::{func, render};
/// use mortar_core::Dialect;
///
/// let f = func("generate_series", [1, 3]);
/// assert_eq!(render(&f, Dialect::MySQL, 1).unwrap().0, "generate_series(1, 3)");
/// ```
pub fn func<I>(name: impl Into<CompactString>, args: I) -> Function
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Function {
        name: name.into(),
        args: args.into_iter().map(Into::into).collect(),
        distinct: false,
        filter: Vec::new(),
        over: None,
    }
}

impl Function {
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a `FILTER (WHERE ...)` condition; repeated calls are ANDed.
    #[must_use]
    pub fn filter(mut self, cond: impl Into<Expr>) -> Self {
        self.filter.push(cond.into());
        self
    }

    /// `OVER (window)`
    #[must_use]
    pub fn over(mut self, window: impl Into<WindowDef>) -> Self {
        self.over = Some(Over::Def(window.into()));
        self
    }

    /// `OVER name`, referencing a window from the `WINDOW` clause
    #[must_use]
    pub fn over_named(mut self, name: impl Into<CompactString>) -> Self {
        self.over = Some(Over::Named(name.into()));
        self
    }

    pub fn r#as(self, alias: impl Into<CompactString>) -> Expr {
        Expr::from(self).r#as(alias)
    }
}

impl Expression for Function {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        w.push_str(&self.name);
        w.push('(');
        if self.distinct {
            w.push_str("DISTINCT ");
        }
        let mut params = express_slice(w, d, start, &self.args, "", ", ", "")?;
        w.push(')');

        if !self.filter.is_empty() {
            w.push_str(" FILTER (WHERE ");
            params.extend(write_logical(
                w,
                d,
                start + params.len(),
                &self.filter,
                Logic::And,
            )?);
            w.push(')');
        }

        match &self.over {
            Some(Over::Named(name)) => {
                w.push_str(" OVER ");
                w.push_str(name);
            }
            Some(Over::Def(def)) => {
                w.push_str(" OVER (");
                params.extend(def.write_sql(w, d, start + params.len())?);
                w.push(')');
            }
            None => {}
        }

        Ok(params)
    }
}

impl From<Function> for Expr {
    #[inline]
    fn from(f: Function) -> Self {
        Expr::Func(Box::new(f))
    }
}
