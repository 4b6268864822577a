//! # Shared queue: ring buffer plus wait/signal plumbing.
//!
//! [`SharedQueue`] is the synchronization shell around [`Ring`]: one mutex
//! serializes pushes, pops, and clears, and a [`Semaphore`] carries the
//! "queue has data" signal to the slot workers of the owning handling — one
//! permit per queued event, so a burst of pushes wakes one idle slot per
//! event instead of coalescing into a single wakeup.
//!
//! ## Architecture
//! ```text
//!   publish ──► push ──► add one permit ──┐
//!                                         ▼
//!   slot 1 ──┐                      (one waiter per permit)
//!   slot 2 ──┼── pop-or-wait ──► exactly one slot pops each event
//!   slot N ──┘
//! ```
//!
//! ## Rules
//! - Slots race for events through the mutex; each event is popped by exactly
//!   one slot (competing consumers).
//! - A woken slot that finds the ring empty treats it as a spurious wake and
//!   goes back to waiting — no polling loops. Stale permits (event popped
//!   before the waiter got there, or a cleared queue) only cause such
//!   spurious wakes.
//! - `wake_all` closes the semaphore so every parked waiter returns; only the
//!   owning handling's stop path calls it.

use tokio::sync::{Mutex, Semaphore};

use crate::queue::ring::Ring;

/// Ring buffer shared between one producer side and N competing slot workers.
pub(crate) struct SharedQueue<E> {
    ring: Mutex<Ring<E>>,
    signal: Semaphore,
}

impl<E> SharedQueue<E> {
    /// Creates an empty queue with the given initial ring capacity.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(Ring::with_capacity(capacity)),
            signal: Semaphore::new(0),
        }
    }

    /// Appends an event and banks one wake permit for the slot workers.
    ///
    /// Never blocks on a full ring; the ring grows by one slot instead.
    pub(crate) async fn push(&self, event: E) {
        self.ring.lock().await.push(event);
        self.signal.add_permits(1);
    }

    /// Pops the head event, or `None` when the queue is empty.
    pub(crate) async fn pop(&self) -> Option<E> {
        self.ring.lock().await.pop()
    }

    /// Waits until a push has banked a permit, or the queue was stopped.
    ///
    /// The permit is consumed, not returned: each queued event wakes at most
    /// one waiter once. Returns immediately once `wake_all` has run.
    pub(crate) async fn wait(&self) {
        match self.signal.acquire().await {
            Ok(permit) => permit.forget(),
            // Closed by wake_all; the caller re-checks its stop token.
            Err(_closed) => {}
        }
    }

    /// Wakes every waiting slot; used when the owning handling stops.
    pub(crate) fn wake_all(&self) {
        self.signal.close();
    }

    /// Number of pending events.
    pub(crate) async fn occupied(&self) -> usize {
        self.ring.lock().await.occupied()
    }

    /// Current ring capacity.
    pub(crate) async fn capacity(&self) -> usize {
        self.ring.lock().await.capacity()
    }

    /// Empties the queue; capacity and waiting slots are unaffected.
    pub(crate) async fn clear(&self) {
        self.ring.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_push_then_pop() {
        let q = SharedQueue::new(4);
        q.push(1u32).await;
        q.push(2).await;
        assert_eq!(q.occupied().await, 2);
        assert_eq!(q.pop().await, Some(1));
        assert_eq!(q.pop().await, Some(2));
        assert_eq!(q.pop().await, None);
    }

    #[tokio::test]
    async fn test_push_stores_wake_permit() {
        // A push with no waiter must leave a permit so the next wait returns
        // immediately instead of sleeping past the event.
        let q = SharedQueue::new(2);
        q.push(9u32).await;
        tokio::time::timeout(Duration::from_millis(100), q.wait())
            .await
            .expect("wait must observe the stored permit");
        assert_eq!(q.pop().await, Some(9));
    }

    #[tokio::test]
    async fn test_each_push_banks_its_own_permit() {
        // Permits must not coalesce: a burst landing while every slot is
        // busy has to wake one waiter per queued event.
        let q = SharedQueue::new(4);
        q.push(1u32).await;
        q.push(2).await;
        q.push(3).await;
        for _ in 0..3 {
            tokio::time::timeout(Duration::from_millis(100), q.wait())
                .await
                .expect("one wake per queued event");
        }
    }

    #[tokio::test]
    async fn test_wake_all_releases_parked_waiter() {
        let q = std::sync::Arc::new(SharedQueue::<u32>::new(2));
        let waiter = {
            let q = std::sync::Arc::clone(&q);
            tokio::spawn(async move { q.wait().await })
        };
        // Give the waiter a chance to park first.
        tokio::time::sleep(Duration::from_millis(20)).await;
        q.wake_all();
        tokio::time::timeout(Duration::from_millis(100), waiter)
            .await
            .expect("wake_all must release the waiter")
            .unwrap();
    }

    #[tokio::test]
    async fn test_clear_keeps_capacity() {
        let q = SharedQueue::new(2);
        for i in 0..5u32 {
            q.push(i).await;
        }
        let cap = q.capacity().await;
        q.clear().await;
        assert_eq!(q.occupied().await, 0);
        assert_eq!(q.capacity().await, cap);
    }
}
