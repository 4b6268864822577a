//! # Dispatcher: the publish/subscribe facade.
//!
//! The [`Dispatcher`] owns, per event type, a priority-sorted list of
//! handlings (queue + competing slot workers) and exposes the whole public
//! API: queue creation, subscription, publishing, introspection,
//! reconfiguration, and graceful shutdown.
//!
//! ## High-level architecture
//! ```text
//! publish::<E>(event)
//!     │  (per-type lock; unrelated event types never contend)
//!     ▼
//! TypeRegistry<E> ── snapshot, priority order ──┐
//!                                               ▼
//!                  Handling q1 (High)   Handling q2 (Medium)   ...
//!                   push + wake          push + wake
//!                       │                     │
//!                  slot workers race      slot workers race
//!                  (one slot per event)   (one slot per event)
//!
//! Shutdown path:
//!   shutdown() ─► root token cancel  → propagates to every handling's token
//!             ─► stop_all per type: wake all ─► join every slot
//!             ─► bounded by cfg.grace; stragglers reported as GraceExceeded
//! ```
//!
//! ## Delivery semantics
//! - **Fan-out across handlings**: `publish` copies the event into every
//!   queue registered for its type.
//! - **Competing consumers within a handling**: exactly one slot pops each
//!   queued event.
//! - FIFO within one queue; no ordering across queues or event types.
//!
//! ## Example
//! ```rust
//! use eventvisor::{Dispatcher, HandlerSpec, Priority};
//!
//! #[derive(Clone)]
//! struct Greeting(String);
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let dispatcher = Dispatcher::default();
//!
//!     let spec = HandlerSpec::from_fn("printer", |ev: Greeting| async move {
//!         println!("{}", ev.0);
//!     });
//!     dispatcher.subscribe(spec, Priority::Medium).await;
//!
//!     assert!(dispatcher.publish(Greeting("hello".into())).await);
//!     let _ = dispatcher.shutdown().await;
//! }
//! ```

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::DispatcherConfig;
use crate::dispatcher::registry::{AnyRegistry, TypeRegistry};
use crate::error::DispatchError;
use crate::events::Event;
use crate::handlers::HandlerSpec;
use crate::handling::{Handling, Priority, QueueId, SlotId};

/// Typed publish/subscribe dispatcher.
///
/// An explicitly constructed instance — inject it where it is needed; there
/// is no process-wide singleton. Dropping the dispatcher cancels every slot
/// worker without blocking; call [`Dispatcher::shutdown`] for a joined,
/// grace-bounded drain.
pub struct Dispatcher {
    cfg: DispatcherConfig,
    /// Root of the cancellation tree; every handling's token is a child.
    root: CancellationToken,
    /// Per-event-type registries, keyed by `TypeId`. The outer lock guards
    /// only lookup/insert; all queue work happens under per-type locks.
    types: RwLock<HashMap<TypeId, Arc<dyn AnyRegistry>>>,
}

impl Dispatcher {
    /// Creates a dispatcher with the given configuration.
    pub fn new(cfg: DispatcherConfig) -> Self {
        Self {
            cfg,
            root: CancellationToken::new(),
            types: RwLock::new(HashMap::new()),
        }
    }

    // ---------------------------
    // Queue creation & subscription
    // ---------------------------

    /// Creates an empty queue for `E` with the given priority.
    ///
    /// The queue has no slot workers yet; attach them with
    /// [`Dispatcher::subscribe_to`] or [`Dispatcher::subscribe_many`].
    pub async fn add_queue<E: Event>(&self, priority: Priority) -> QueueId {
        let registry = self.registry_or_insert::<E>().await;
        let handling = self.new_handling::<E>(priority);
        let id = handling.id();
        registry.add(handling).await;
        tracing::debug!(
            queue = %id,
            event_type = type_name::<E>(),
            priority = %priority,
            "queue added"
        );
        id
    }

    /// Creates a new queue for `E` and attaches one slot driven by `spec`.
    pub async fn subscribe<E: Event>(&self, spec: HandlerSpec<E>, priority: Priority) -> QueueId {
        let registry = self.registry_or_insert::<E>().await;
        let handling = self.new_handling::<E>(priority);
        let id = handling.id();
        handling.add_subscriber(spec).await;
        registry.add(handling).await;
        tracing::debug!(
            queue = %id,
            event_type = type_name::<E>(),
            priority = %priority,
            "queue added with subscriber"
        );
        id
    }

    /// Attaches one more slot to an existing queue.
    ///
    /// Safe while the queue is live: new slots join the competition on the
    /// shared queue handle immediately.
    pub async fn subscribe_to<E: Event>(
        &self,
        id: QueueId,
        spec: HandlerSpec<E>,
    ) -> Result<(), DispatchError> {
        let handling = self.find::<E>(id).await?;
        handling.add_subscriber(spec).await;
        Ok(())
    }

    /// Attaches `count` slots to an existing queue, one spec per slot.
    ///
    /// The factory receives each slot's [`SlotId`] and may build a distinct
    /// handler instance per slot (e.g. per-slot local state).
    pub async fn subscribe_many<E: Event, F>(
        &self,
        id: QueueId,
        count: usize,
        factory: F,
    ) -> Result<(), DispatchError>
    where
        F: Fn(SlotId) -> HandlerSpec<E>,
    {
        let handling = self.find::<E>(id).await?;
        handling.add_subscribers(count, factory).await;
        Ok(())
    }

    // ---------------------------
    // Publishing
    // ---------------------------

    /// Broadcasts `event` to every queue registered for `E`.
    ///
    /// Never panics and never returns an error: internal faults are logged
    /// and folded into the return value. `false` means the event did not
    /// reach all targets — including the case of zero registered targets.
    pub async fn publish<E: Event>(&self, event: E) -> bool {
        let Some(registry) = self.registry::<E>().await else {
            tracing::error!(
                event_type = type_name::<E>(),
                "publish: no queues registered for event type"
            );
            return false;
        };

        let targets = registry.snapshot().await;
        if targets.is_empty() {
            tracing::error!(
                event_type = type_name::<E>(),
                "publish: event type has no queues"
            );
            return false;
        }

        let mut delivered_all = true;
        for handling in &targets {
            if let Err(err) = handling.add_event(event.clone()).await {
                tracing::error!(
                    queue = %handling.id(),
                    event_type = type_name::<E>(),
                    error = err.as_label(),
                    "publish: {}",
                    err.as_message()
                );
                delivered_all = false;
            }
        }
        delivered_all
    }

    /// Delivers `event` to exactly one queue, addressed by id.
    ///
    /// Unlike [`Dispatcher::publish`] this fails loudly: an unknown id or a
    /// stopped queue surfaces as an error to the caller.
    pub async fn publish_to_queue<E: Event>(
        &self,
        id: QueueId,
        event: E,
    ) -> Result<(), DispatchError> {
        let handling = self.find::<E>(id).await?;
        handling.add_event(event).await
    }

    // ---------------------------
    // Introspection & reconfiguration
    // ---------------------------

    /// Changes a queue's priority and re-sorts the visitation order.
    pub async fn set_priority<E: Event>(
        &self,
        id: QueueId,
        priority: Priority,
    ) -> Result<(), DispatchError> {
        let registry = self
            .registry::<E>()
            .await
            .ok_or(DispatchError::TypeNotRegistered {
                type_name: type_name::<E>(),
            })?;
        let handling = registry
            .find(id)
            .await
            .ok_or(DispatchError::UnknownQueue { id })?;
        handling.set_priority(priority);
        registry.resort().await;
        tracing::debug!(queue = %id, priority = %priority, "priority updated");
        Ok(())
    }

    /// Current priority of a queue.
    pub async fn get_priority<E: Event>(&self, id: QueueId) -> Result<Priority, DispatchError> {
        Ok(self.find::<E>(id).await?.priority())
    }

    /// Current ring capacity of a queue (initial capacity plus growth).
    pub async fn queue_size<E: Event>(&self, id: QueueId) -> Result<usize, DispatchError> {
        Ok(self.find::<E>(id).await?.capacity().await)
    }

    /// Number of events pending in a queue.
    pub async fn occupied_in_queue<E: Event>(&self, id: QueueId) -> Result<usize, DispatchError> {
        Ok(self.find::<E>(id).await?.occupied().await)
    }

    /// Number of slot workers attached to a queue.
    pub async fn handlers_in_queue<E: Event>(&self, id: QueueId) -> Result<usize, DispatchError> {
        Ok(self.find::<E>(id).await?.amount_handlers().await)
    }

    /// Number of queues registered for `E`.
    pub async fn amount_of_queues<E: Event>(&self) -> usize {
        match self.registry::<E>().await {
            Some(registry) => registry.len().await,
            None => 0,
        }
    }

    /// Queue ids for `E` in visitation (priority) order, high first.
    pub async fn queue_ids<E: Event>(&self) -> Vec<QueueId> {
        match self.registry::<E>().await {
            Some(registry) => registry.ids().await,
            None => Vec::new(),
        }
    }

    // ---------------------------
    // Clearing & removal
    // ---------------------------

    /// Empties one queue; its subscribers and in-flight invocations are
    /// unaffected.
    pub async fn clear_queue<E: Event>(&self, id: QueueId) -> Result<(), DispatchError> {
        self.find::<E>(id).await?.clear().await;
        Ok(())
    }

    /// Empties every queue registered for `E`. No-op for an unknown type.
    pub async fn clear_type<E: Event>(&self) {
        if let Some(registry) = self.registry::<E>().await {
            registry.clear_all().await;
        }
    }

    /// Empties every queue of every event type.
    pub async fn clear(&self) {
        let registries: Vec<Arc<dyn AnyRegistry>> =
            self.types.read().await.values().cloned().collect();
        for registry in registries {
            registry.clear_all().await;
        }
    }

    /// Stops a queue (joining its slots) and removes it from the dispatcher.
    ///
    /// The explicit removal operation; [`Dispatcher::clear_queue`] never
    /// unlists a queue.
    pub async fn remove_queue<E: Event>(&self, id: QueueId) -> Result<(), DispatchError> {
        let registry = self
            .registry::<E>()
            .await
            .ok_or(DispatchError::TypeNotRegistered {
                type_name: type_name::<E>(),
            })?;
        let handling = registry
            .remove(id)
            .await
            .ok_or(DispatchError::UnknownQueue { id })?;
        handling.stop().await;
        tracing::debug!(queue = %id, "queue removed");
        Ok(())
    }

    // ---------------------------
    // Shutdown
    // ---------------------------

    /// Stops every queue of every type: cancel, wake, join — bounded by the
    /// configured grace.
    ///
    /// Pending events are abandoned; in-flight handler calls are not
    /// interrupted (their slots join as soon as the call returns, and a
    /// non-responsive handler is reported via
    /// [`DispatchError::GraceExceeded`] rather than waited out forever).
    /// Idempotent: a second shutdown joins nothing and returns `Ok`.
    pub async fn shutdown(&self) -> Result<(), DispatchError> {
        tracing::debug!("shutdown requested");
        self.root.cancel();

        let registries: Vec<Arc<dyn AnyRegistry>> =
            self.types.read().await.values().cloned().collect();

        let drain = async {
            for registry in &registries {
                registry.stop_all().await;
            }
        };

        match time::timeout(self.cfg.grace, drain).await {
            Ok(()) => {
                tracing::debug!("all slots stopped within grace");
                Ok(())
            }
            Err(_elapsed) => {
                let mut stuck = Vec::new();
                for registry in &registries {
                    stuck.extend(registry.stuck_ids().await);
                }
                let err = DispatchError::GraceExceeded {
                    grace: self.cfg.grace,
                    stuck,
                };
                tracing::error!(error = err.as_label(), "{}", err.as_message());
                Err(err)
            }
        }
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn new_handling<E: Event>(&self, priority: Priority) -> Arc<Handling<E>> {
        Arc::new(Handling::new(
            priority,
            self.cfg.initial_capacity,
            self.root.child_token(),
        ))
    }

    /// Typed registry for `E`, if any queue was ever created for it.
    async fn registry<E: Event>(&self) -> Option<TypeRegistry<E>> {
        let map = self.types.read().await;
        map.get(&TypeId::of::<E>())
            .and_then(|registry| registry.as_any().downcast_ref::<TypeRegistry<E>>())
            .cloned()
    }

    /// Typed registry for `E`, created on first use.
    async fn registry_or_insert<E: Event>(&self) -> TypeRegistry<E> {
        if let Some(registry) = self.registry::<E>().await {
            return registry;
        }

        let mut map = self.types.write().await;
        // Double-check: another task may have registered the type between
        // the read above and taking the write lock.
        if let Some(existing) = map
            .get(&TypeId::of::<E>())
            .and_then(|registry| registry.as_any().downcast_ref::<TypeRegistry<E>>())
        {
            return existing.clone();
        }
        let registry = TypeRegistry::<E>::new();
        map.insert(TypeId::of::<E>(), Arc::new(registry.clone()));
        registry
    }

    /// Looks up one handling, failing loudly on unknown type or id.
    async fn find<E: Event>(&self, id: QueueId) -> Result<Arc<Handling<E>>, DispatchError> {
        let registry = self
            .registry::<E>()
            .await
            .ok_or(DispatchError::TypeNotRegistered {
                type_name: type_name::<E>(),
            })?;
        registry
            .find(id)
            .await
            .ok_or(DispatchError::UnknownQueue { id })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatcherConfig::default())
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // Wake and release every slot worker; never block in drop. Slots
        // observe the cancelled root token and exit on their own.
        self.root.cancel();
    }
}
