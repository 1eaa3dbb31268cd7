//! Tracing utilities for query, statement and callback observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// mortar_trace_query!(&sql, params.len());
/// ```
#[macro_export]
macro_rules! mortar_trace_query {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(sql = %$sql, params = $param_count, "mortar.query");
    };
}

/// Emit a debug-level tracing event for a statement operation.
///
/// ```ignore
/// mortar_trace_stmt!("one", self.query_type);
/// ```
#[macro_export]
macro_rules! mortar_trace_stmt {
    ($op:literal, $query_type:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(op = $op, query_type = %$query_type, "mortar.stmt");
    };
}

/// Emit a trace-level event before a hook runs.
#[macro_export]
macro_rules! mortar_trace_hook {
    ($stage:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(stage = %$stage, "mortar.hook");
    };
}

/// Emit a trace-level event before a loader runs.
#[macro_export]
macro_rules! mortar_trace_loader {
    ($index:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(loader = $index, "mortar.loader");
    };
}
