use compact_str::CompactString;

use crate::clause::{Lock, LockStrength, LockWait};
use crate::mods::{Mod, SetFor};

/// A locking clause. `nowait` and `skip_locked` override each other; the
/// last one called wins.
#[derive(Debug, Clone)]
pub struct LockChain {
    lock: Lock,
}

impl LockChain {
    pub fn new<I>(strength: LockStrength, tables: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        let mut lock = Lock::new(strength);
        lock.tables = tables.into_iter().map(Into::into).collect();
        Self { lock }
    }

    fn wait(&self, wait: LockWait) -> Self {
        let mut lock = self.lock.clone();
        lock.wait = wait;
        Self { lock }
    }

    #[must_use]
    pub fn nowait(&self) -> Self {
        self.wait(LockWait::NoWait)
    }

    #[must_use]
    pub fn skip_locked(&self) -> Self {
        self.wait(LockWait::SkipLocked)
    }
}

impl<Q: SetFor> Mod<Q> for LockChain {
    fn apply(&self, q: &mut Q) {
        q.set_for(self.lock.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Target(Option<Lock>);

    impl SetFor for Target {
        fn set_for(&mut self, lock: Lock) {
            self.0 = Some(lock);
        }
    }

    #[test]
    fn test_last_wait_policy_wins() {
        let mut t = Target(None);
        LockChain::new(LockStrength::Share, Vec::<CompactString>::new())
            .nowait()
            .skip_locked()
            .apply(&mut t);
        assert_eq!(t.0.map(|l| l.wait), Some(LockWait::SkipLocked));
    }
}
