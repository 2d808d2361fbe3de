//! Request Sequencing
//!
//! Feed requests are fired on a timer and never cancelled, so a slow
//! response can arrive after a newer one. Each request is tagged with a
//! number from a [`RequestSequence`]; the component applying responses keeps
//! a [`SequenceGuard`] and refuses anything not newer than what it has
//! already applied.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::MapError;

/// Monotonic source of request sequence numbers, starting at 1
#[derive(Debug, Default)]
pub struct RequestSequence {
    last: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        RequestSequence::default()
    }

    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Most recently issued number, 0 if none
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

/// Tracks the newest response applied so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceGuard {
    applied: Option<u64>,
}

impl SequenceGuard {
    pub fn new() -> Self {
        SequenceGuard::default()
    }

    pub fn applied(&self) -> Option<u64> {
        self.applied
    }

    /// Fail if `sequence` is not newer than the last applied response
    pub fn check(&self, sequence: u64) -> Result<(), MapError> {
        match self.applied {
            Some(applied) if sequence <= applied => {
                Err(MapError::StaleResponse { sequence, applied })
            }
            _ => Ok(()),
        }
    }

    /// Record `sequence` as applied. Call only after a successful `check`.
    pub fn commit(&mut self, sequence: u64) {
        self.applied = Some(self.applied.map_or(sequence, |a| a.max(sequence)));
    }
}
