//! Database driver adapters.

#[cfg(feature = "rusqlite")]
pub mod rusqlite;
