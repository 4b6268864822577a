//! # Identifiers for queues and slot workers.
//!
//! [`QueueId`] addresses one handling (queue + its competing slot workers)
//! for the lifetime of the owning dispatcher. Ids come from a global
//! monotonic counter, so they are process-unique and never reused.
//!
//! [`SlotId`] is the per-handling index of one slot worker; it is what a
//! timeout callback receives to identify which worker overran.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global sequence counter for queue ids.
static QUEUE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Process-unique identifier of one handling.
///
/// Returned by `add_queue`/`subscribe`; stable for the handling's lifetime.
/// An id that was never handed out (or whose handling was removed) makes
/// every id-scoped operation fail with
/// [`DispatchError::UnknownQueue`](crate::DispatchError::UnknownQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(u64);

impl QueueId {
    /// Allocates the next process-unique id.
    pub(crate) fn next() -> Self {
        Self(QUEUE_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Raw numeric value, for logs and metrics.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Index of one slot worker within its handling (0-based, in attach order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(usize);

impl SlotId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw worker index.
    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_ids_are_unique_and_monotonic() {
        let a = QueueId::next();
        let b = QueueId::next();
        let c = QueueId::next();
        assert!(a < b && b < c);
        assert_ne!(a, c);
    }
}
