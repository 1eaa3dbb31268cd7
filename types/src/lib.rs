//! Shared type definitions for mortar
//!
//! This crate provides the small vocabulary every other mortar crate agrees on:
//!
//! - [`Dialect`] - Database dialect enum (MySQL, PostgreSQL, SQLite)
//! - [`QueryType`] - The kind of statement a query renders to, handed to
//!   after-query hooks
//!
//! # Features
//!
//! - `std` - Standard library support (enabled by default)
//! - `alloc` - Allocator support for no_std environments
//! - `serde` - Enable serde serialization/deserialization

#![cfg_attr(not(feature = "std"), no_std)]

mod dialect;
mod query_type;

pub use dialect::{Dialect, DialectParseError};
pub use query_type::QueryType;

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::{Dialect, QueryType};
}
