//! Expression AST.
//!
//! Every SQL fragment is an [`Expression`]: given a dialect and the 1-based
//! index of the next placeholder, it writes its text and returns the
//! arguments it consumed, in order. Rendering is pure and repeatable; the next
//! free placeholder index is always `start + params.len()`.
//!
//! [`Expr`] is the closed set of fragments the builder produces. Plain strings
//! convert into [`Expr::Literal`] and are written verbatim, so column names,
//! qualified references and keywords can be passed where an expression is
//! expected.
//!
//! # Example
//!
//! ```
//! use mortar_core::expr;
//! use mortar_core::Dialect;
//!
//! let cond = expr::lit("age").gte(expr::args([18])).and(expr::lit("active"));
//! let (sql, params) = expr::render(&cond, Dialect::PostgreSQL, 1).unwrap();
//! assert_eq!(sql, "age >= $1 AND active");
//! assert_eq!(params.len(), 1);
//! ```

mod case;
mod function;

pub use case::{CaseChain, CaseExpr, case};
pub use function::{Function, func};

use core::fmt;
use std::sync::Arc;

use compact_str::{CompactString, ToCompactString};
use smallvec::SmallVec;

use crate::dialect::{Dialect, DialectExt};
use crate::error::{MortarError, Result};
use crate::param::{Param, Params};
use crate::value::Value;

/// A renderable SQL fragment
pub trait Expression: fmt::Debug + Send + Sync {
    /// Writes SQL for this expression, numbering placeholders from `start`.
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params>;
}

impl<E: Expression + ?Sized> Expression for &E {
    #[inline]
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        (**self).write_sql(w, d, start)
    }
}

impl<E: Expression + ?Sized> Expression for Box<E> {
    #[inline]
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        (**self).write_sql(w, d, start)
    }
}

impl<E: Expression + ?Sized> Expression for Arc<E> {
    #[inline]
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        (**self).write_sql(w, d, start)
    }
}

/// Renders an expression into fresh SQL text and its arguments.
pub fn render<E: Expression + ?Sized>(e: &E, d: Dialect, start: usize) -> Result<(String, Params)> {
    let mut sql = String::with_capacity(64);
    let params = e.write_sql(&mut sql, d, start)?;
    Ok((sql, params))
}

// =============================================================================
// Rendering helpers
// =============================================================================

/// Writes `exprs` between `prefix` and `suffix`, separated by `sep`.
///
/// Writes nothing at all when `exprs` is empty.
pub fn express_slice<E: Expression>(
    w: &mut String,
    d: Dialect,
    start: usize,
    exprs: &[E],
    prefix: &str,
    sep: &str,
    suffix: &str,
) -> Result<Params> {
    let mut params = Params::new();
    if exprs.is_empty() {
        return Ok(params);
    }
    w.push_str(prefix);
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            w.push_str(sep);
        }
        params.extend(e.write_sql(w, d, start + params.len())?);
    }
    w.push_str(suffix);
    Ok(params)
}

/// Writes `e` between `prefix` and `suffix` if present.
pub fn express_if<E: Expression>(
    w: &mut String,
    d: Dialect,
    start: usize,
    e: Option<&E>,
    prefix: &str,
    suffix: &str,
) -> Result<Params> {
    match e {
        Some(e) => {
            w.push_str(prefix);
            let params = e.write_sql(w, d, start)?;
            w.push_str(suffix);
            Ok(params)
        }
        None => Ok(Params::new()),
    }
}

/// Writes plain names joined by `", "`.
pub fn write_names(w: &mut String, names: &[CompactString]) {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            w.push_str(", ");
        }
        w.push_str(name);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Logic {
    And,
    Or,
}

/// Writes a conjunction or disjunction, parenthesizing nested operands of the
/// other kind. Zero operands render the identity (`TRUE` for AND, `FALSE` for OR).
pub(crate) fn write_logical(
    w: &mut String,
    d: Dialect,
    start: usize,
    exprs: &[Expr],
    logic: Logic,
) -> Result<Params> {
    match exprs {
        [] => {
            w.push_str(d.bool_literal(logic == Logic::And));
            Ok(Params::new())
        }
        [only] => only.write_sql(w, d, start),
        _ => {
            let sep = match logic {
                Logic::And => " AND ",
                Logic::Or => " OR ",
            };
            let mut params = Params::new();
            for (i, e) in exprs.iter().enumerate() {
                if i > 0 {
                    w.push_str(sep);
                }
                let wrap = e.needs_parens_in(logic);
                if wrap {
                    w.push('(');
                }
                params.extend(e.write_sql(w, d, start + params.len())?);
                if wrap {
                    w.push(')');
                }
            }
            Ok(params)
        }
    }
}

/// Writes `exprs` as a conjunction, for WHERE and HAVING bodies.
#[inline]
pub fn express_and(w: &mut String, d: Dialect, start: usize, exprs: &[Expr]) -> Result<Params> {
    write_logical(w, d, start, exprs, Logic::And)
}

// =============================================================================
// Expr
// =============================================================================

/// The closed set of expression fragments
#[derive(Debug, Clone)]
pub enum Expr {
    /// Text written verbatim: `users.id`, `COUNT(*)`, `42`
    Literal(CompactString),
    /// A single-quoted string literal: `'a string'`
    Str(CompactString),
    /// A dialect-quoted identifier path: `` `table`.`column` ``
    Quoted(SmallVec<[CompactString; 2]>),
    /// Raw SQL whose `?` marks are replaced by dialect placeholders
    Raw {
        sql: CompactString,
        args: Vec<Value>,
    },
    /// Bound arguments: `?, ?, ?` or `(?, ?, ?)` when grouped
    Args { values: Vec<Value>, grouped: bool },
    /// `n` placeholders whose values are supplied at execution time
    Placeholder(usize),
    /// A dialect boolean constant
    Bool(bool),
    /// Parenthesized list: `(a, b)`
    Group(Vec<Expr>),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    /// Operands joined by a separator, e.g. `a || b || c`
    Join {
        exprs: Vec<Expr>,
        sep: &'static str,
    },
    Binary {
        left: Box<Expr>,
        op: &'static str,
        right: Box<Expr>,
    },
    /// An operand followed by fixed text, e.g. `a IS NULL`
    Suffix {
        expr: Box<Expr>,
        suffix: &'static str,
    },
    Cast {
        expr: Box<Expr>,
        ty: CompactString,
    },
    Alias {
        expr: Box<Expr>,
        alias: CompactString,
    },
    Func(Box<Function>),
    Case(Box<CaseExpr>),
    /// Any expression (usually a query), rendered in parentheses
    Subquery(Arc<dyn Expression>),
}

impl Expr {
    fn needs_parens_in(&self, logic: Logic) -> bool {
        match (self, logic) {
            (Expr::Or(v), Logic::And) | (Expr::And(v), Logic::Or) => v.len() > 1,
            _ => false,
        }
    }

    fn is_compound(&self) -> bool {
        match self {
            Expr::And(v) | Expr::Or(v) => v.len() > 1,
            Expr::Binary { .. } => true,
            _ => false,
        }
    }

    fn binary(self, op: &'static str, right: impl Into<Expr>) -> Expr {
        Expr::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right.into()),
        }
    }

    /// `self = right`
    pub fn eq(self, right: impl Into<Expr>) -> Expr {
        self.binary(" = ", right)
    }

    /// `self <> right`
    pub fn ne(self, right: impl Into<Expr>) -> Expr {
        self.binary(" <> ", right)
    }

    pub fn lt(self, right: impl Into<Expr>) -> Expr {
        self.binary(" < ", right)
    }

    pub fn lte(self, right: impl Into<Expr>) -> Expr {
        self.binary(" <= ", right)
    }

    pub fn gt(self, right: impl Into<Expr>) -> Expr {
        self.binary(" > ", right)
    }

    pub fn gte(self, right: impl Into<Expr>) -> Expr {
        self.binary(" >= ", right)
    }

    pub fn like(self, right: impl Into<Expr>) -> Expr {
        self.binary(" LIKE ", right)
    }

    /// `self IN (a, b, ...)`
    pub fn in_<I>(self, items: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        self.binary(" IN ", group(items))
    }

    pub fn is_null(self) -> Expr {
        Expr::Suffix {
            expr: Box::new(self),
            suffix: " IS NULL",
        }
    }

    pub fn is_not_null(self) -> Expr {
        Expr::Suffix {
            expr: Box::new(self),
            suffix: " IS NOT NULL",
        }
    }

    /// Appends `other` to a conjunction.
    pub fn and(self, other: impl Into<Expr>) -> Expr {
        match self {
            Expr::And(mut v) => {
                v.push(other.into());
                Expr::And(v)
            }
            this => Expr::And(vec![this, other.into()]),
        }
    }

    /// Appends `other` to a disjunction.
    pub fn or(self, other: impl Into<Expr>) -> Expr {
        match self {
            Expr::Or(mut v) => {
                v.push(other.into());
                Expr::Or(v)
            }
            this => Expr::Or(vec![this, other.into()]),
        }
    }

    /// `self AS alias`
    pub fn r#as(self, alias: impl Into<CompactString>) -> Expr {
        Expr::Alias {
            expr: Box::new(self),
            alias: alias.into(),
        }
    }
}

fn write_placeholders(w: &mut String, d: Dialect, start: usize, n: usize) {
    for i in 0..n {
        if i > 0 {
            w.push_str(", ");
        }
        d.write_placeholder(w, start + i);
    }
}

/// Byte offsets of the `?` marks outside single-quoted literals. A doubled
/// `''` toggles twice and so stays inside the literal.
fn raw_marks(sql: &str) -> Vec<usize> {
    let mut quoted = false;
    sql.char_indices()
        .filter_map(|(i, c)| match c {
            '\'' => {
                quoted = !quoted;
                None
            }
            '?' if !quoted => Some(i),
            _ => None,
        })
        .collect()
}

fn write_raw(w: &mut String, d: Dialect, start: usize, sql: &str, args: &[Value]) -> Result<Params> {
    let marks = raw_marks(sql);
    if marks.len() != args.len() {
        return Err(MortarError::Render(format!(
            "raw SQL has {} placeholders but {} arguments",
            marks.len(),
            args.len()
        )));
    }
    let mut last = 0;
    for (i, at) in marks.into_iter().enumerate() {
        w.push_str(&sql[last..at]);
        d.write_placeholder(w, start + i);
        last = at + 1;
    }
    w.push_str(&sql[last..]);
    Ok(args.iter().cloned().map(Param::from).collect())
}

impl Expression for Expr {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        match self {
            Expr::Literal(s) => {
                w.push_str(s);
                Ok(Params::new())
            }
            Expr::Str(s) => {
                w.push('\'');
                for c in s.chars() {
                    if c == '\'' {
                        w.push('\'');
                    }
                    w.push(c);
                }
                w.push('\'');
                Ok(Params::new())
            }
            Expr::Quoted(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        w.push('.');
                    }
                    d.write_quoted(w, part);
                }
                Ok(Params::new())
            }
            Expr::Raw { sql, args } => write_raw(w, d, start, sql, args),
            Expr::Args { values, grouped } => {
                if *grouped {
                    w.push('(');
                }
                write_placeholders(w, d, start, values.len());
                if *grouped {
                    w.push(')');
                }
                Ok(values.iter().cloned().map(Param::from).collect())
            }
            Expr::Placeholder(n) => {
                write_placeholders(w, d, start, *n);
                Ok((0..*n).map(|_| Param::unbound()).collect())
            }
            Expr::Bool(b) => {
                w.push_str(d.bool_literal(*b));
                Ok(Params::new())
            }
            Expr::Group(exprs) => {
                w.push('(');
                let params = express_slice(w, d, start, exprs, "", ", ", "")?;
                w.push(')');
                Ok(params)
            }
            Expr::Not(e) => {
                w.push_str("NOT ");
                if e.is_compound() {
                    w.push('(');
                    let params = e.write_sql(w, d, start)?;
                    w.push(')');
                    Ok(params)
                } else {
                    e.write_sql(w, d, start)
                }
            }
            Expr::And(exprs) => write_logical(w, d, start, exprs, Logic::And),
            Expr::Or(exprs) => write_logical(w, d, start, exprs, Logic::Or),
            Expr::Join { exprs, sep } => express_slice(w, d, start, exprs, "", sep, ""),
            Expr::Binary { left, op, right } => {
                let mut params = write_operand(w, d, start, left)?;
                w.push_str(op);
                params.extend(write_operand(w, d, start + params.len(), right)?);
                Ok(params)
            }
            Expr::Suffix { expr, suffix } => {
                let params = write_operand(w, d, start, expr)?;
                w.push_str(suffix);
                Ok(params)
            }
            Expr::Cast { expr, ty } => {
                w.push_str("CAST(");
                let params = expr.write_sql(w, d, start)?;
                w.push_str(" AS ");
                w.push_str(ty);
                w.push(')');
                Ok(params)
            }
            Expr::Alias { expr, alias } => {
                let params = expr.write_sql(w, d, start)?;
                w.push_str(" AS ");
                w.push_str(alias);
                Ok(params)
            }
            Expr::Func(f) => f.write_sql(w, d, start),
            Expr::Case(c) => c.write_sql(w, d, start),
            Expr::Subquery(q) => {
                w.push('(');
                let params = q.write_sql(w, d, start)?;
                w.push(')');
                Ok(params)
            }
        }
    }
}

fn write_operand(w: &mut String, d: Dialect, start: usize, e: &Expr) -> Result<Params> {
    let wrap = matches!(e, Expr::And(v) | Expr::Or(v) if v.len() > 1);
    if wrap {
        w.push('(');
    }
    let params = e.write_sql(w, d, start)?;
    if wrap {
        w.push(')');
    }
    Ok(params)
}

// =============================================================================
// Conversions
// =============================================================================

impl From<&str> for Expr {
    #[inline]
    fn from(s: &str) -> Self {
        Expr::Literal(CompactString::from(s))
    }
}

impl From<String> for Expr {
    #[inline]
    fn from(s: String) -> Self {
        Expr::Literal(CompactString::from(s))
    }
}

impl From<CompactString> for Expr {
    #[inline]
    fn from(s: CompactString) -> Self {
        Expr::Literal(s)
    }
}

impl From<&Expr> for Expr {
    #[inline]
    fn from(e: &Expr) -> Self {
        e.clone()
    }
}

impl From<bool> for Expr {
    #[inline]
    fn from(b: bool) -> Self {
        Expr::Bool(b)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Expr {
                #[inline]
                fn from(n: $ty) -> Self {
                    Expr::Literal(n.to_compact_string())
                }
            }
        )*
    };
}

impl_from_number!(i32, i64, u32, u64, usize, f64);

// =============================================================================
// Constructors
// =============================================================================

/// Text written verbatim.
pub fn lit(s: impl Into<CompactString>) -> Expr {
    Expr::Literal(s.into())
}

/// A single-quoted string literal: `'a string'`.
pub fn string(s: impl Into<CompactString>) -> Expr {
    Expr::Str(s.into())
}

/// A quoted identifier path, e.g. `quote(["users", "id"])`.
pub fn quote<I>(parts: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<CompactString>,
{
    Expr::Quoted(parts.into_iter().map(Into::into).collect())
}

/// Raw SQL; each `?` becomes a placeholder bound to the next argument.
pub fn raw<I>(sql: impl Into<CompactString>, args: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Expr::Raw {
        sql: sql.into(),
        args: args.into_iter().map(Into::into).collect(),
    }
}

/// Bound arguments: `?, ?, ?`.
pub fn args<I>(values: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Expr::Args {
        values: values.into_iter().map(Into::into).collect(),
        grouped: false,
    }
}

/// Bound arguments in parentheses: `(?, ?, ?)`.
pub fn arg_group<I>(values: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Expr::Args {
        values: values.into_iter().map(Into::into).collect(),
        grouped: true,
    }
}

/// `n` placeholders with no bound values.
pub fn placeholder(n: usize) -> Expr {
    Expr::Placeholder(n)
}

/// `(a, b)`.
pub fn group<I>(exprs: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Expr::Group(exprs.into_iter().map(Into::into).collect())
}

pub fn not(e: impl Into<Expr>) -> Expr {
    Expr::Not(Box::new(e.into()))
}

/// `a AND b AND c`; no operands render the dialect's `TRUE`.
pub fn and<I>(exprs: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Expr::And(exprs.into_iter().map(Into::into).collect())
}

/// `a OR b OR c`; no operands render the dialect's `FALSE`.
pub fn or<I>(exprs: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Expr::Or(exprs.into_iter().map(Into::into).collect())
}

/// `a || b || c`.
pub fn concat<I>(exprs: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Expr::Join {
        exprs: exprs.into_iter().map(Into::into).collect(),
        sep: " || ",
    }
}

/// `CAST(e AS ty)`.
pub fn cast(e: impl Into<Expr>, ty: impl Into<CompactString>) -> Expr {
    Expr::Cast {
        expr: Box::new(e.into()),
        ty: ty.into(),
    }
}

/// Any expression (typically a query) in parentheses.
pub fn subquery(q: impl Expression + 'static) -> Expr {
    Expr::Subquery(Arc::new(q))
}
