//! Immutable chain builders.
//!
//! A chain accumulates one clause. Every fluent method takes `&self` and
//! returns a new chain holding an updated copy, so a partially built chain can
//! be kept as a template and branched. Applying a chain as a [`Mod`](crate::mods::Mod)
//! is the only step that touches a query: it hands a copy of the clause to
//! exactly one capability method.
//!
//! ```
//! use mortar_core::chain::OrderBy;
//! use mortar_core::expr::render;
//! use mortar_core::clause::OrderDef;
//! use mortar_core::Dialect;
//!
//! let base = OrderBy::new("name");
//! let desc = base.desc().collate("binary");
//!
//! let base: OrderDef = base.into();
//! let desc: OrderDef = desc.into();
//! assert_eq!(render(&base, Dialect::MySQL, 1).unwrap().0, "name");
//! assert_eq!(render(&desc, Dialect::MySQL, 1).unwrap().0, "name COLLATE binary DESC");
//! ```

mod cte;
mod from;
mod join;
mod lock;
mod order;
mod window;

pub use cte::CteChain;
pub use from::{FromChain, IndexHintChain};
pub use join::{JoinChain, JoinMod};
pub use lock::LockChain;
pub use order::OrderBy;
pub use window::WindowChain;
