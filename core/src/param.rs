use smallvec::SmallVec;

use crate::error::{MortarError, Result};
use crate::value::Value;

/// A rendered query argument.
///
/// `Arg` expressions render bound params; `Placeholder(n)` renders `n`
/// unbound ones whose values are supplied at execution time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Param {
    /// The value to bind, if known at build time
    pub value: Option<Value>,
}

impl Param {
    #[inline]
    pub fn bound(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    #[inline]
    pub const fn unbound() -> Self {
        Self { value: None }
    }

    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.value.is_some()
    }
}

impl From<Value> for Param {
    #[inline]
    fn from(value: Value) -> Self {
        Self { value: Some(value) }
    }
}

/// Rendered arguments in placeholder order
pub type Params = SmallVec<[Param; 8]>;

/// Turns rendered params into execution arguments.
///
/// Fails with [`MortarError::UnboundParameter`] (1-based index) on the first
/// placeholder that has no value.
pub fn bind_all(params: &[Param]) -> Result<Vec<Value>> {
    params
        .iter()
        .enumerate()
        .map(|(i, p)| {
            p.value
                .clone()
                .ok_or(MortarError::UnboundParameter { index: i + 1 })
        })
        .collect()
}
