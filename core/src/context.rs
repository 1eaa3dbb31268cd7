//! Per-call context: cancellation, deadline and request-scoped values.
//!
//! Every suspension point of the execution pipeline (hooks, prepare,
//! exec/query and each loader) calls [`Context::check`] first, so a cancelled
//! context aborts at the next one with [`MortarError::Cancelled`] or
//! [`MortarError::DeadlineExceeded`].

use core::fmt;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::{MortarError, Result};

type Values = HashMap<&'static str, Arc<dyn Any + Send + Sync>>;

/// Cheap-to-clone execution context.
///
/// Derived contexts inherit the cancellation tokens of their parent and keep
/// the earliest deadline, so cancelling a parent cancels every child.
#[derive(Clone, Default)]
pub struct Context {
    tokens: SmallVec<[Arc<AtomicBool>; 2]>,
    deadline: Option<Instant>,
    values: Option<Arc<Values>>,
}

/// Cancels the context returned alongside it by [`Context::with_cancel`].
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.load(Ordering::Acquire)
    }
}

impl Context {
    /// An empty context that is never cancelled.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// A child context plus the handle that cancels it.
    #[must_use]
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let token = Arc::new(AtomicBool::new(false));
        let mut child = self.clone();
        child.tokens.push(Arc::clone(&token));
        (child, CancelHandle { token })
    }

    /// A child context that expires at `at`, or at the parent's deadline if earlier.
    #[must_use]
    pub fn with_deadline(&self, at: Instant) -> Self {
        let mut child = self.clone();
        child.deadline = Some(match self.deadline {
            Some(existing) if existing < at => existing,
            _ => at,
        });
        child
    }

    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// A child context carrying `value` under `key`, shadowing any parent value.
    #[must_use]
    pub fn with_value<V: Any + Send + Sync>(&self, key: &'static str, value: V) -> Self {
        let mut child = self.clone();
        let values = child.values.get_or_insert_with(Default::default);
        Arc::make_mut(values).insert(key, Arc::new(value));
        child
    }

    /// Looks up a value by key; `None` if absent or of a different type.
    pub fn value<V: Any>(&self, key: &str) -> Option<&V> {
        self.values.as_ref()?.get(key)?.downcast_ref::<V>()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The error this context would abort with right now, if any.
    #[must_use]
    pub fn err(&self) -> Option<MortarError> {
        if self.tokens.iter().any(|t| t.load(Ordering::Acquire)) {
            return Some(MortarError::Cancelled);
        }
        match self.deadline {
            Some(at) if Instant::now() >= at => Some(MortarError::DeadlineExceeded),
            _ => None,
        }
    }

    #[inline]
    pub fn check(&self) -> Result<()> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: SmallVec<[&str; 4]> = self
            .values
            .iter()
            .flat_map(|v| v.keys().copied())
            .collect();
        f.debug_struct("Context")
            .field("cancel_tokens", &self.tokens.len())
            .field("deadline", &self.deadline)
            .field("values", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        assert!(Context::background().check().is_ok());
    }

    #[test]
    fn test_cancel_propagates_to_children() {
        let (parent, handle) = Context::background().with_cancel();
        let child = parent.with_value("tenant", 42_u32);
        assert!(child.check().is_ok());

        handle.cancel();
        assert!(matches!(child.check(), Err(MortarError::Cancelled)));
        assert!(matches!(parent.err(), Some(MortarError::Cancelled)));
    }

    #[test]
    fn test_cancelling_child_leaves_parent() {
        let parent = Context::background();
        let (child, handle) = parent.with_cancel();
        handle.cancel();
        assert!(child.check().is_err());
        assert!(parent.check().is_ok());
    }

    #[test]
    fn test_deadline_keeps_earliest() {
        let now = Instant::now();
        let ctx = Context::background().with_deadline(now);
        let later = ctx.with_timeout(Duration::from_secs(60));
        assert_eq!(later.deadline(), Some(now));
        assert!(matches!(later.check(), Err(MortarError::DeadlineExceeded)));
    }

    #[test]
    fn test_values_are_copy_on_write() {
        let a = Context::background().with_value("k", 1_i32);
        let b = a.with_value("k", 2_i32);
        assert_eq!(a.value::<i32>("k"), Some(&1));
        assert_eq!(b.value::<i32>("k"), Some(&2));
        assert_eq!(b.value::<String>("k"), None);
        assert_eq!(b.value::<i32>("missing"), None);
    }
}
