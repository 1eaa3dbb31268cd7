use compact_str::CompactString;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::expr::{Expression, write_names};
use crate::param::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockStrength {
    Update,
    Share,
}

impl LockStrength {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LockStrength::Update => "UPDATE",
            LockStrength::Share => "SHARE",
        }
    }
}

/// What a locking read does when a row is already locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockWait {
    #[default]
    Block,
    NoWait,
    SkipLocked,
}

/// `FOR {UPDATE|SHARE} [OF t, ...] [NOWAIT|SKIP LOCKED]`
///
/// The wait policy holds a single value; the last one set wins.
#[derive(Debug, Clone)]
pub struct Lock {
    pub strength: LockStrength,
    pub tables: Vec<CompactString>,
    pub wait: LockWait,
}

impl Lock {
    pub fn new(strength: LockStrength) -> Self {
        Self {
            strength,
            tables: Vec::new(),
            wait: LockWait::Block,
        }
    }
}

impl Expression for Lock {
    fn write_sql(&self, w: &mut String, _d: Dialect, _start: usize) -> Result<Params> {
        w.push_str("FOR ");
        w.push_str(self.strength.as_str());
        if !self.tables.is_empty() {
            w.push_str(" OF ");
            write_names(w, &self.tables);
        }
        match self.wait {
            LockWait::Block => {}
            LockWait::NoWait => w.push_str(" NOWAIT"),
            LockWait::SkipLocked => w.push_str(" SKIP LOCKED"),
        }
        Ok(Params::new())
    }
}
