//! # Mortar
//!
//! A dialect-aware SQL query builder. Queries are assembled by applying
//! *mods* to a starter, rendered to `(sql, params)` in one pass, and run
//! through a pipeline that scans rows, runs loaders and then after-query
//! hooks.
//!
//! ## Quick start
//!
//! ```rust
//! use mortar::mysql::{self, arg, lit, sm};
//! use mortar::build;
//!
//! let q = mysql::select((
//!     sm::columns(["id", "name"]),
//!     sm::from("users"),
//!     sm::r#where(lit("id").eq(arg([42]))),
//!     sm::order_by("name").desc(),
//! ));
//!
//! let (sql, params) = build(&q).unwrap();
//! assert_eq!(sql, "SELECT id, name FROM users WHERE id = ? ORDER BY name DESC");
//! assert_eq!(params.len(), 1);
//! ```
//!
//! ## Executing
//!
//! Anything implementing [`Executor`] can run a [`Query`]; [`Preparer`]s
//! additionally support [`prepare`] and [`prepare_query`], whose statements
//! can be executed many times with different arguments.
//!
//! ```rust,ignore
//! let users: Vec<(i64, String)> = mortar::all(&ctx, &conn, &q, from_row())?;
//! ```
//!
//! # Features
//!
//! - `std` - Standard library support (enabled by default)
//! - `tracing` - Log rendered statements through `tracing` (enabled by default)
//! - `rusqlite` - [`Executor`] and [`Preparer`] for `rusqlite::Connection`
//! - `serde` - Serialize [`Dialect`] and [`QueryType`]

#![cfg_attr(docsrs, feature(doc_cfg))]

// =============================================================================
// Root-level exports
// =============================================================================

pub use mortar_core::{
    CancelHandle, Context, Cursor, Dialect, ExecResult, Executor, Expr, Expression, Mod,
    MortarError, Partial, Preparer, Query, QueryStmt, QueryType, RawQuery, Result, Statement,
    Stmt, build, prepare, prepare_query, raw_query,
};

/// Direct execution without a prepared statement.
pub use mortar_core::exec::{all, cursor, exec, one};

/// Error types
pub mod error {
    pub use mortar_core::error::{HookStage, MortarError, Partial};
}

/// Shared dialect and query-type definitions.
pub use mortar_types as types;

// =============================================================================
// Core module - building blocks
// =============================================================================

/// Dialect-independent building blocks.
///
/// # Module Structure
///
/// - **Expressions**: [`Expr`](mortar_core::expr::Expr) and its starters
/// - **Clauses**: FROM, JOIN, WITH, WINDOW, ORDER BY and locking clauses
/// - **Chains**: builders that are both a clause and a mod
/// - **Mods**: capability traits and the mods that use them
pub mod core {
    pub use mortar_core::{chain, clause, expr, hook, load, mods};

    /// Parameters collected during rendering
    pub use mortar_core::param::{Param, Params};

    /// Values bound to parameters and read back from rows
    pub use mortar_core::value::{FromValue, Value};

    /// Row scanning
    pub use mortar_core::scan::{
        Decoder, FromRow, Mapper, MapperMod, Row, Rows, VecRows, from_row, mapper_fn, single,
    };

    /// Loaders and hooks
    pub use mortar_core::hook::{AfterQuery, Collection, Hookable, QueryHook};
    pub use mortar_core::load::Loader;
}

// =============================================================================
// MySQL module
// =============================================================================

/// MySQL starters and mods.
pub use mortar_mysql as mysql;

// =============================================================================
// Drivers
// =============================================================================

/// SQLite execution through `rusqlite`.
#[cfg(feature = "rusqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "rusqlite")))]
pub mod rusqlite {
    pub use mortar_core::driver::rusqlite::SqliteStatement;
}

// =============================================================================
// Prelude
// =============================================================================

/// Traits and constructors most programs need.
pub mod prelude {
    pub use crate::core::{
        AfterQuery, FromRow, FromValue, Hookable, Loader, Mapper, MapperMod, QueryHook, Value,
        from_row, mapper_fn, single,
    };
    pub use crate::{
        Context, Executor, Expression, Mod, MortarError, Preparer, Query, QueryType, Result,
        build,
    };
}
