//! # Per-event-type registry of handlings.
//!
//! One [`TypeRegistry`] exists per event type, each behind its own lock, so
//! publishers and subscribers of unrelated event types never contend. The
//! list is kept sorted by priority (high first, creation order within equal
//! priorities); broadcast and introspection visit it in that order.
//!
//! [`AnyRegistry`] is the type-erased face the dispatcher stores in its
//! `TypeId`-keyed map: enough surface to clear, drain, and inspect every
//! type without knowing `E`, plus a downcast hook for the typed operations.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::events::Event;
use crate::handling::{Handling, QueueId};

/// Priority-sorted list of handlings for one event type.
///
/// Cloneable handle — clones share the same list, so the dispatcher can
/// downcast once and keep working on an owned handle after dropping the
/// type-map lock.
#[derive(Clone)]
pub(crate) struct TypeRegistry<E: Event> {
    handlings: Arc<Mutex<Vec<Arc<Handling<E>>>>>,
}

impl<E: Event> TypeRegistry<E> {
    pub(crate) fn new() -> Self {
        Self {
            handlings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a handling and restores priority order.
    pub(crate) async fn add(&self, handling: Arc<Handling<E>>) {
        let mut list = self.handlings.lock().await;
        list.push(handling);
        sort_by_priority(&mut list[..]);
    }

    /// Looks up a handling by id.
    pub(crate) async fn find(&self, id: QueueId) -> Option<Arc<Handling<E>>> {
        self.handlings.lock().await.iter().find(|h| h.id() == id).cloned()
    }

    /// Removes and returns a handling; the caller is responsible for
    /// stopping it.
    pub(crate) async fn remove(&self, id: QueueId) -> Option<Arc<Handling<E>>> {
        let mut list = self.handlings.lock().await;
        let index = list.iter().position(|h| h.id() == id)?;
        Some(list.remove(index))
    }

    /// Re-sorts after a priority change.
    pub(crate) async fn resort(&self) {
        sort_by_priority(&mut self.handlings.lock().await[..]);
    }

    /// Snapshot of the list in visitation (priority) order.
    ///
    /// Taken under the lock, used outside it: broadcast pushes happen on the
    /// snapshot so a slow queue never holds up registrations.
    pub(crate) async fn snapshot(&self) -> Vec<Arc<Handling<E>>> {
        self.handlings.lock().await.clone()
    }

    /// Number of handlings registered for this type.
    pub(crate) async fn len(&self) -> usize {
        self.handlings.lock().await.len()
    }

    /// Queue ids in visitation (priority) order.
    pub(crate) async fn ids(&self) -> Vec<QueueId> {
        self.handlings.lock().await.iter().map(|h| h.id()).collect()
    }
}

/// High first; stable sort keeps creation order within equal priorities.
fn sort_by_priority<E: Event>(list: &mut [Arc<Handling<E>>]) {
    list.sort_by(|a, b| b.priority().cmp(&a.priority()));
}

/// Type-erased registry operations for the dispatcher's `TypeId` map.
#[async_trait]
pub(crate) trait AnyRegistry: Send + Sync + 'static {
    /// Downcast hook for the typed operations.
    fn as_any(&self) -> &dyn Any;

    /// Empties every queue of this type; subscribers are kept.
    async fn clear_all(&self);

    /// Stops every handling of this type: cancel, wake, join.
    async fn stop_all(&self);

    /// Ids of handlings whose slots have not finished joining.
    async fn stuck_ids(&self) -> Vec<QueueId>;
}

#[async_trait]
impl<E: Event> AnyRegistry for TypeRegistry<E> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn clear_all(&self) {
        for handling in self.snapshot().await {
            handling.clear().await;
        }
    }

    async fn stop_all(&self) {
        for handling in self.snapshot().await {
            handling.stop().await;
        }
    }

    async fn stuck_ids(&self) -> Vec<QueueId> {
        self.snapshot()
            .await
            .iter()
            .filter(|h| !h.is_stopped())
            .map(|h| h.id())
            .collect()
    }
}
