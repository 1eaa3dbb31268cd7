//! Dialect-aware SQL expression and query building, plus a statement
//! pipeline that scans rows, runs loaders and then hooks.

pub mod chain;
pub mod clause;
pub mod context;
pub mod dialect;
pub mod error;
pub mod exec;
pub mod expr;
pub mod hook;
pub mod load;
pub mod mods;
pub mod param;
pub mod query;
pub mod scan;
pub mod value;

mod trace;

#[cfg(feature = "rusqlite")]
pub mod driver;

// Re-export key types and traits
pub use context::{CancelHandle, Context};
pub use dialect::{Dialect, DialectExt};
pub use error::{HookStage, MortarError, Partial, Result};
pub use exec::{Cursor, ExecResult, Executor, Preparer, QueryStmt, Statement, Stmt, prepare, prepare_query};
pub use expr::{Expr, Expression};
pub use hook::{AfterQuery, Collection, Hookable, QueryHook};
pub use load::Loader;
pub use mods::Mod;
pub use mortar_types::QueryType;
pub use param::{Param, Params};
pub use query::{Query, RawQuery, build, raw_query};
pub use scan::{FromRow, Mapper, MapperMod, Row, Rows, VecRows};
pub use value::{FromValue, Value};
