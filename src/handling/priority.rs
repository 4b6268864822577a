//! # Delivery priority for handlings.
//!
//! Every handling carries a [`Priority`]; within one event type the
//! dispatcher keeps its handlings sorted **high first**, so broadcast and
//! introspection visit higher-priority queues before lower ones. Priority is
//! mutable after creation (`set_priority`) and a change re-sorts the list.
//!
//! Priority only orders the *visitation* of handlings; it does not reorder
//! events inside a queue and gives no cross-queue completion guarantee.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};

/// Ordered delivery priority of one handling.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    /// Visited last.
    Low = 0,
    /// The default.
    #[default]
    Medium = 1,
    /// Visited first.
    High = 2,
}

impl Priority {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Priority::Low,
            2 => Priority::High,
            _ => Priority::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Lock-free priority cell.
///
/// Reads happen inside the sort comparator of the per-type handling list, so
/// the cell must be readable without taking a lock.
#[derive(Debug)]
pub(crate) struct PriorityCell(AtomicU8);

impl PriorityCell {
    pub(crate) fn new(priority: Priority) -> Self {
        Self(AtomicU8::new(priority as u8))
    }

    pub(crate) fn get(&self) -> Priority {
        Priority::from_u8(self.0.load(AtomicOrdering::Relaxed))
    }

    pub(crate) fn set(&self, priority: Priority) {
        self.0.store(priority as u8, AtomicOrdering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_cell_roundtrip() {
        let cell = PriorityCell::new(Priority::Low);
        assert_eq!(cell.get(), Priority::Low);
        cell.set(Priority::High);
        assert_eq!(cell.get(), Priority::High);
    }
}
