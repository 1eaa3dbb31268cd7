use core::fmt;

use thiserror::Error;

/// Which side of execution a hook ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    /// Query-level hooks, run before the query is rendered
    BeforeQuery,
    /// Result-level hooks, run after loaders
    AfterQuery,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::BeforeQuery => f.write_str("before-query"),
            HookStage::AfterQuery => f.write_str("after-query"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MortarError {
    /// A clause or expression could not be rendered (e.g. a CTE without a query)
    #[error("Render error: {0}")]
    Render(String),

    /// Error preparing a statement
    #[error("Prepare error: {0}")]
    Prepare(String),

    /// Error executing a query
    #[error("Execution error: {0}")]
    Execution(String),

    /// Error mapping a row into a value
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// No rows returned when at least one was expected
    #[error("No rows found")]
    NotFound,

    /// A prepared statement was executed with the wrong number of arguments
    #[error("Argument count mismatch: expected {expected}, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    /// A placeholder without a value reached direct execution
    #[error("Parameter {index} has no bound value")]
    UnboundParameter { index: usize },

    /// A before- or after-query hook failed
    #[error("{stage} hook failed: {source}")]
    Hook {
        stage: HookStage,
        #[source]
        source: Box<MortarError>,
    },

    /// An eager-load step failed; `index` is the 1-based loader position
    #[error("Loader {index} failed: {source}")]
    Loader {
        index: usize,
        #[source]
        source: Box<MortarError>,
    },

    /// The context was cancelled at a suspension point
    #[error("Context cancelled")]
    Cancelled,

    /// The context deadline passed at a suspension point
    #[error("Context deadline exceeded")]
    DeadlineExceeded,

    /// Generic error
    #[error("Database error: {0}")]
    Other(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl MortarError {
    /// Returns `true` for [`MortarError::Cancelled`] and [`MortarError::DeadlineExceeded`].
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, MortarError::Cancelled | MortarError::DeadlineExceeded)
    }

    pub(crate) fn hook(stage: HookStage, err: MortarError) -> Self {
        if err.is_cancellation() {
            return err;
        }
        MortarError::Hook {
            stage,
            source: Box::new(err),
        }
    }

    pub(crate) fn loader(index: usize, err: MortarError) -> Self {
        if err.is_cancellation() {
            return err;
        }
        MortarError::Loader {
            index,
            source: Box::new(err),
        }
    }
}

/// Result type for database operations
pub type Result<T, E = MortarError> = std::result::Result<T, E>;

/// An error raised after a value had already been scanned.
///
/// Loader and hook failures keep the scanned value so the caller can decide
/// whether the partial data is usable. Errors raised before scanning carry
/// no value. Converts into [`MortarError`] with `?`, dropping the value.
pub struct Partial<T> {
    pub error: MortarError,
    pub value: Option<T>,
}

impl<T> Partial<T> {
    pub fn new(error: MortarError, value: Option<T>) -> Self {
        Self { error, value }
    }

    /// The error, discarding any scanned value.
    pub fn into_error(self) -> MortarError {
        self.error
    }

    /// Splits into the error and the best-effort value.
    pub fn into_parts(self) -> (MortarError, Option<T>) {
        (self.error, self.value)
    }

    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

impl<T> fmt::Debug for Partial<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partial")
            .field("error", &self.error)
            .field("has_value", &self.value.is_some())
            .finish()
    }
}

impl<T> fmt::Display for Partial<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<T> std::error::Error for Partial<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<T> From<MortarError> for Partial<T> {
    fn from(error: MortarError) -> Self {
        Self { error, value: None }
    }
}

impl<T> From<Partial<T>> for MortarError {
    fn from(partial: Partial<T>) -> Self {
        partial.error
    }
}
