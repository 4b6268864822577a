//! # Handling: one prioritized queue plus its pool of competing slots.
//!
//! A [`Handling`] is the unit a [`QueueId`] addresses: the shared event
//! queue, the stop token, and the join handles of every slot worker attached
//! to it. It is owned exclusively by the dispatcher's per-event-type list.
//!
//! ## Lifecycle
//! ```text
//! add_queue/subscribe ──► Handling::new (token = child of dispatcher root)
//!        add_subscriber ──► spawn_slot (shared queue handle, shared token)
//!        add_event      ──► queue.push + wake one slot
//!        clear          ──► empty the queue, keep subscribers
//!        stop           ──► cancel ─► wake all ─► join every slot ─► stopped
//! ```
//!
//! Attaching more slots while running is allowed: the queue's
//! synchronization lives in the shared handle, not in any one slot.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::DispatchError;
use crate::events::Event;
use crate::handlers::HandlerSpec;
use crate::handling::priority::PriorityCell;
use crate::handling::slot::spawn_slot;
use crate::handling::{Priority, QueueId, SlotId};
use crate::queue::SharedQueue;

/// Named, prioritized queue with a pool of competing slot workers.
pub(crate) struct Handling<E: Event> {
    id: QueueId,
    priority: PriorityCell,
    queue: Arc<SharedQueue<E>>,
    /// Child of the dispatcher's root token; cancelling either stops us.
    token: CancellationToken,
    slots: Mutex<Vec<JoinHandle<()>>>,
    next_slot: AtomicUsize,
    /// Set only after every slot task has been joined.
    stopped: AtomicBool,
}

impl<E: Event> Handling<E> {
    /// Creates an empty handling with no slots attached yet.
    pub(crate) fn new(priority: Priority, capacity: usize, token: CancellationToken) -> Self {
        Self {
            id: QueueId::next(),
            priority: PriorityCell::new(priority),
            queue: Arc::new(SharedQueue::new(capacity)),
            token,
            slots: Mutex::new(Vec::new()),
            next_slot: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> QueueId {
        self.id
    }

    pub(crate) fn priority(&self) -> Priority {
        self.priority.get()
    }

    /// Updates the priority; the owning registry re-sorts its list.
    pub(crate) fn set_priority(&self, priority: Priority) {
        self.priority.set(priority);
    }

    /// Queues one event and wakes a slot.
    ///
    /// Fails only when the handling has been stopped; the queue itself grows
    /// instead of rejecting writes.
    pub(crate) async fn add_event(&self, event: E) -> Result<(), DispatchError> {
        if self.token.is_cancelled() {
            return Err(DispatchError::QueueStopped { id: self.id });
        }
        self.queue.push(event).await;
        Ok(())
    }

    /// Attaches one slot worker driven by `spec`.
    pub(crate) async fn add_subscriber(&self, spec: HandlerSpec<E>) {
        let slot = self.alloc_slot();
        self.attach(slot, spec).await;
    }

    /// Attaches `count` slots, one spec per slot from the factory.
    ///
    /// The factory receives the [`SlotId`] and may build a distinct handler
    /// instance per slot (e.g. for per-slot local state). The id handed to
    /// the factory is the one the spawned worker carries; attachments may
    /// race on the same handling without two slots sharing an id.
    pub(crate) async fn add_subscribers<F>(&self, count: usize, factory: F)
    where
        F: Fn(SlotId) -> HandlerSpec<E>,
    {
        for _ in 0..count {
            let slot = self.alloc_slot();
            let spec = factory(slot);
            self.attach(slot, spec).await;
        }
    }

    /// Allocates the next slot id for this handling.
    fn alloc_slot(&self) -> SlotId {
        SlotId::new(self.next_slot.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Spawns the worker for an already-allocated slot id.
    async fn attach(&self, slot: SlotId, spec: HandlerSpec<E>) {
        tracing::debug!(
            queue = %self.id,
            slot = %slot,
            handler = spec.handler_name(),
            "attaching slot"
        );
        let handle = spawn_slot(
            self.id,
            slot,
            spec,
            Arc::clone(&self.queue),
            self.token.clone(),
        );
        self.slots.lock().await.push(handle);
    }

    /// Stops delivery and joins every slot worker. Idempotent.
    ///
    /// Ordering matters: flip the token first, then wake every blocked slot,
    /// then join. In-flight handler calls are not interrupted.
    pub(crate) async fn stop(&self) {
        self.token.cancel();
        self.queue.wake_all();

        let handles: Vec<JoinHandle<()>> = {
            let mut slots = self.slots.lock().await;
            slots.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
        self.stopped.store(true, AtomicOrdering::Release);
        tracing::debug!(queue = %self.id, "handling stopped");
    }

    /// True once `stop` has joined every slot task.
    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(AtomicOrdering::Acquire)
    }

    /// Empties the queue; subscribers and in-flight invocations are kept.
    pub(crate) async fn clear(&self) {
        self.queue.clear().await;
        tracing::trace!(queue = %self.id, "queue cleared");
    }

    /// Number of pending events.
    pub(crate) async fn occupied(&self) -> usize {
        self.queue.occupied().await
    }

    /// Current ring capacity.
    pub(crate) async fn capacity(&self) -> usize {
        self.queue.capacity().await
    }

    /// Number of slot workers attached.
    pub(crate) async fn amount_handlers(&self) -> usize {
        self.slots.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;

    #[derive(Clone)]
    struct Tick(u32);

    fn counting_spec(counter: Arc<AtomicUsize>) -> HandlerSpec<Tick> {
        HandlerSpec::from_fn("counter", move |_ev: Tick| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, AtomicOrdering::SeqCst);
            }
        })
    }

    #[tokio::test]
    async fn test_add_event_after_stop_fails() {
        let handling: Handling<Tick> =
            Handling::new(Priority::Medium, 4, CancellationToken::new());
        handling.stop().await;
        let res = handling.add_event(Tick(1)).await;
        assert!(matches!(res, Err(DispatchError::QueueStopped { .. })));
    }

    #[tokio::test]
    async fn test_double_stop_is_noop() {
        let handling: Handling<Tick> =
            Handling::new(Priority::Medium, 4, CancellationToken::new());
        let counter = Arc::new(AtomicUsize::new(0));
        handling.add_subscriber(counting_spec(counter)).await;

        handling.stop().await;
        handling.stop().await;
        assert!(handling.is_stopped());
    }

    #[tokio::test]
    async fn test_stop_wakes_idle_slots() {
        let handling: Handling<Tick> =
            Handling::new(Priority::Medium, 4, CancellationToken::new());
        let counter = Arc::new(AtomicUsize::new(0));
        handling
            .add_subscribers(3, |_slot| counting_spec(Arc::clone(&counter)))
            .await;
        assert_eq!(handling.amount_handlers().await, 3);

        // Slots are idle-waiting; stop must not hang on the join.
        tokio::time::timeout(Duration::from_secs(2), handling.stop())
            .await
            .expect("stop must join idle slots promptly");
        assert!(handling.is_stopped());
    }

    #[tokio::test]
    async fn test_concurrent_attach_assigns_distinct_slot_ids() {
        let handling = Arc::new(Handling::<Tick>::new(
            Priority::Medium,
            4,
            CancellationToken::new(),
        ));
        let ids = Arc::new(std::sync::Mutex::new(Vec::new()));
        let counter = Arc::new(AtomicUsize::new(0));

        // Two tasks racing to attach on the same handling; every factory
        // call must see the id its worker actually runs under, so no id may
        // be handed out twice.
        let mut attachers = Vec::new();
        for _ in 0..2 {
            let handling = Arc::clone(&handling);
            let ids = Arc::clone(&ids);
            let counter = Arc::clone(&counter);
            attachers.push(tokio::spawn(async move {
                handling
                    .add_subscribers(4, |slot| {
                        ids.lock().unwrap().push(slot);
                        counting_spec(Arc::clone(&counter))
                    })
                    .await;
            }));
        }
        for attacher in attachers {
            attacher.await.unwrap();
        }

        let seen: std::collections::HashSet<SlotId> =
            ids.lock().unwrap().iter().copied().collect();
        let expected: std::collections::HashSet<SlotId> =
            (0..8).map(SlotId::new).collect();
        assert_eq!(seen, expected);
        assert_eq!(handling.amount_handlers().await, 8);
        handling.stop().await;
    }

    #[tokio::test]
    async fn test_clear_keeps_subscribers() {
        let handling: Handling<Tick> =
            Handling::new(Priority::Medium, 4, CancellationToken::new());
        for i in 0..3 {
            handling.add_event(Tick(i)).await.unwrap();
        }
        handling.clear().await;
        assert_eq!(handling.occupied().await, 0);

        // Delivery resumes after clear.
        let counter = Arc::new(AtomicUsize::new(0));
        handling.add_subscriber(counting_spec(Arc::clone(&counter))).await;
        handling.add_event(Tick(9)).await.unwrap();
        for _ in 0..50 {
            if counter.load(AtomicOrdering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 1);
        handling.stop().await;
    }
}
