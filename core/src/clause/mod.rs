//! Structured SQL sub-clauses.
//!
//! Clauses are plain data assembled by chains and handed to queries through
//! the capability traits in [`crate::mods`]. Each clause renders itself as an
//! [`Expression`](crate::expr::Expression); the enclosing statement writes
//! the leading keyword (`FROM`, `WINDOW`, ...) and the separators between
//! clauses.

mod cte;
mod from;
mod join;
mod lock;
mod order;
mod window;

pub use cte::{Cte, With};
pub use from::{FromClause, IndexHint, IndexHintKind, IndexHintScope};
pub use join::{Join, JoinKind};
pub use lock::{Lock, LockStrength, LockWait};
pub use order::{Direction, OrderDef};
pub use window::{Frame, FrameBound, FrameMode, NamedWindow, WindowDef};
