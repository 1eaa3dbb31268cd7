//! MySQL dialect.
//!
//! Statements are built by applying mods from [`sm`] (SELECT) and [`um`]
//! (UPDATE) to a starter:
//!
//! ```
//! use mortar_mysql::{select, sm};
//! use mortar_core::build;
//!
//! let q = select((
//!     sm::columns(["u.id", "u.name"]),
//!     sm::from("users").r#as("u").use_index(["idx_users_email"]),
//!     sm::r#where("u.active = 1"),
//! ));
//! let (sql, _) = build(&q).unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT u.id, u.name FROM users AS u USE INDEX (idx_users_email) WHERE u.active = 1"
//! );
//! ```

pub mod select;
pub mod sm;
pub mod um;
pub mod update;

use compact_str::CompactString;
use mortar_core::expr::{self, CaseChain, Expr, Function};
use mortar_core::mods::Mod;
use mortar_core::value::Value;

pub use mortar_types::Dialect;
pub use select::SelectQuery;
pub use update::{AppendSet, Set, UpdateQuery};

/// The dialect every statement in this crate renders with.
pub const DIALECT: Dialect = Dialect::MySQL;

/// Starts a SELECT and applies `mods` in order.
pub fn select<M: Mod<SelectQuery>>(mods: M) -> SelectQuery {
    SelectQuery::new().apply(mods)
}

/// Starts an UPDATE and applies `mods` in order.
pub fn update<M: Mod<UpdateQuery>>(mods: M) -> UpdateQuery {
    UpdateQuery::new().apply(mods)
}

// =============================================================================
// Expression starters
// =============================================================================

/// A function call: `name(args...)`.
pub fn f<I>(name: impl Into<CompactString>, args: I) -> Function
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    expr::func(name, args)
}

/// A string literal.
#[inline]
pub fn s(text: impl Into<CompactString>) -> Expr {
    expr::string(text)
}

/// A plain SQL fragment written as is.
#[inline]
pub fn lit(text: impl Into<CompactString>) -> Expr {
    expr::lit(text)
}

/// A backtick-quoted identifier, joined with dots.
pub fn quote<I>(parts: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<CompactString>,
{
    expr::quote(parts)
}

pub fn not(e: impl Into<Expr>) -> Expr {
    expr::not(e)
}

pub fn and<I>(exprs: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    expr::and(exprs)
}

pub fn or<I>(exprs: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    expr::or(exprs)
}

/// `CONCAT(a, b, ...)`; MySQL only treats `||` as concatenation in
/// `PIPES_AS_CONCAT` mode.
pub fn concat<I>(exprs: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    f("CONCAT", exprs).into()
}

/// Bound arguments.
pub fn arg<I>(values: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    expr::args(values)
}

/// Bound arguments in parentheses, e.g. for `IN`.
pub fn arg_group<I>(values: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    expr::arg_group(values)
}

/// `n` placeholders filled at execution time.
#[inline]
pub fn placeholder(n: usize) -> Expr {
    expr::placeholder(n)
}

pub fn group<I>(exprs: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    expr::group(exprs)
}

/// Raw SQL where each `?` is bound to the next argument.
pub fn raw<I>(sql: impl Into<CompactString>, args: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    expr::raw(sql, args)
}

pub fn cast(e: impl Into<Expr>, ty: impl Into<CompactString>) -> Expr {
    expr::cast(e, ty)
}

/// Starts a `CASE` expression.
#[inline]
pub fn case() -> CaseChain {
    expr::case()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortar_core::expr::render;

    fn sql(e: &Expr) -> String {
        render(e, DIALECT, 1).unwrap().0
    }

    #[test]
    fn test_concat_is_a_function() {
        assert_eq!(sql(&concat(["a", "b"])), "CONCAT(a, b)");
    }

    #[test]
    fn test_quote_uses_backticks() {
        assert_eq!(sql(&quote(["users", "id"])), "`users`.`id`");
    }

    #[test]
    fn test_case_keeps_when_order() {
        let e = case()
            .when("c1", "t1")
            .when("c2", "t2")
            .r#else("e");
        assert_eq!(sql(&e), "CASE WHEN c1 THEN t1 WHEN c2 THEN t2 ELSE e END");
    }

    #[test]
    fn test_arg_group_binds_in_order() {
        let (text, params) = render(&arg_group(["a", "b", "c"]), DIALECT, 1).unwrap();
        assert_eq!(text, "(?, ?, ?)");
        let values: Vec<_> = params.into_iter().filter_map(|p| p.value).collect();
        assert_eq!(
            values,
            vec![Value::from("a"), Value::from("b"), Value::from("c")]
        );
    }
}
