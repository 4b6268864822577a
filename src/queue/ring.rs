//! # Growable ring buffer for pending events.
//!
//! [`Ring`] is the storage behind every queue: a circular buffer that holds
//! events in strict FIFO order. Unlike a fixed-capacity ring it never rejects
//! a write — pushing into a full buffer grows the capacity by exactly one
//! slot and the push still lands at the tail.
//!
//! ## Rules
//! - `push` never blocks, never fails, never drops data.
//! - `pop` returns `None` on an empty buffer; callers must not busy-loop on
//!   that, they block on the owning queue's wake signal instead (see
//!   [`SharedQueue`](crate::queue::SharedQueue)).
//! - `clear` empties the buffer but keeps the grown capacity.
//! - Insertion order is preserved; there is no reordering within one ring.

/// Circular FIFO buffer that grows by one slot when full.
#[derive(Debug)]
pub(crate) struct Ring<E> {
    /// Backing storage; `None` marks a free slot.
    buf: Vec<Option<E>>,
    /// Index of the next element to pop.
    head: usize,
    /// Number of occupied slots.
    len: usize,
}

impl<E> Ring<E> {
    /// Creates an empty ring with the given initial capacity (clamped to 1).
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut buf = Vec::with_capacity(capacity);
        buf.resize_with(capacity, || None);
        Self { buf, head: 0, len: 0 }
    }

    /// Appends an event at the tail, growing the capacity by one when full.
    pub(crate) fn push(&mut self, event: E) {
        if self.len == self.buf.len() {
            self.grow_one();
        }
        let tail = (self.head + self.len) % self.buf.len();
        self.buf[tail] = Some(event);
        self.len += 1;
    }

    /// Removes and returns the head event, or `None` when empty.
    pub(crate) fn pop(&mut self) -> Option<E> {
        if self.len == 0 {
            return None;
        }
        let event = self.buf[self.head].take();
        self.head = (self.head + 1) % self.buf.len();
        self.len -= 1;
        event
    }

    /// Number of pending events.
    pub(crate) fn occupied(&self) -> usize {
        self.len
    }

    /// Current capacity (initial capacity plus any growth).
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Drops all pending events; capacity is unchanged.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.buf {
            *slot = None;
        }
        self.len = 0;
    }

    /// Opens exactly one free slot at the logical tail.
    ///
    /// Inserting at `head` shifts the wrapped tail segment right by one, so
    /// the new free slot sits between the last queued event and the head.
    /// The follow-up tail computation `(head + len) % new_cap` then resolves
    /// to the inserted slot.
    fn grow_one(&mut self) {
        self.buf.insert(self.head, None);
        self.head += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_fifo() {
        let mut ring = Ring::with_capacity(8);
        for i in 0..5 {
            ring.push(i);
        }
        for i in 0..5 {
            assert_eq!(ring.pop(), Some(i));
        }
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_pop_empty_returns_none() {
        let mut ring: Ring<u32> = Ring::with_capacity(4);
        assert_eq!(ring.pop(), None);
        assert_eq!(ring.occupied(), 0);
    }

    #[test]
    fn test_full_push_grows_by_exactly_one() {
        let mut ring = Ring::with_capacity(4);
        for i in 0..4 {
            ring.push(i);
        }
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.occupied(), 4);

        ring.push(4);
        assert_eq!(ring.capacity(), 5);
        assert_eq!(ring.occupied(), 5);

        for i in 0..5 {
            assert_eq!(ring.pop(), Some(i));
        }
        assert_eq!(ring.pop(), None);
        assert_eq!(ring.capacity(), 5);
    }

    #[test]
    fn test_grow_with_wrapped_head() {
        let mut ring = Ring::with_capacity(4);
        for i in 0..4 {
            ring.push(i);
        }
        // Advance head so the occupied region wraps around.
        assert_eq!(ring.pop(), Some(0));
        assert_eq!(ring.pop(), Some(1));
        ring.push(4);
        ring.push(5);
        assert_eq!(ring.occupied(), 4);

        // Full with head in the middle; grow must keep FIFO order.
        ring.push(6);
        assert_eq!(ring.capacity(), 5);
        for i in 2..=6 {
            assert_eq!(ring.pop(), Some(i));
        }
    }

    #[test]
    fn test_repeated_growth() {
        let mut ring = Ring::with_capacity(1);
        for i in 0..16 {
            ring.push(i);
        }
        assert_eq!(ring.capacity(), 16);
        assert_eq!(ring.occupied(), 16);
        for i in 0..16 {
            assert_eq!(ring.pop(), Some(i));
        }
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut ring = Ring::with_capacity(2);
        for i in 0..6 {
            ring.push(i);
        }
        let grown = ring.capacity();
        ring.clear();
        assert_eq!(ring.occupied(), 0);
        assert_eq!(ring.capacity(), grown);
        assert_eq!(ring.pop(), None);

        // Still usable after clear.
        ring.push(42);
        assert_eq!(ring.pop(), Some(42));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut ring = Ring::with_capacity(0);
        assert_eq!(ring.capacity(), 1);
        ring.push(7);
        assert_eq!(ring.pop(), Some(7));
    }

    #[test]
    fn test_interleaved_push_pop() {
        let mut ring = Ring::with_capacity(3);
        let mut expect = 0;
        let mut next = 0;
        for round in 0..50 {
            for _ in 0..(round % 4) {
                ring.push(next);
                next += 1;
            }
            while let Some(v) = ring.pop() {
                assert_eq!(v, expect);
                expect += 1;
            }
        }
        assert_eq!(expect, next);
    }
}
