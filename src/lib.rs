//! # eventvisor
//!
//! **Eventvisor** is a typed, in-process publish/subscribe dispatch engine
//! for Rust.
//!
//! Events are routed by their static type to one or more prioritized queues;
//! each queue is drained by a pool of competing handler workers, every
//! invocation can be bounded by an advisory timeout, and shutdown is a
//! cooperative, grace-bounded drain.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     publish::<E>(event)            publish::<F>(event)
//!            │                              │
//!            ▼                              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher (facade)                                              │
//! │  - per-event-type registry, each behind its own lock              │
//! │  - handlings sorted by priority (high visited first)              │
//! │  - root CancellationToken (parent of every queue's token)         │
//! └──────┬──────────────────────┬─────────────────────────────────────┘
//!        ▼                      ▼
//! ┌──────────────┐       ┌──────────────┐
//! │ Handling q0  │       │ Handling q1  │     (fan-out: every queue of
//! │ ring buffer  │       │ ring buffer  │      the type gets a copy)
//! └┬─────────┬───┘       └──────┬───────┘
//!  ▼         ▼                  ▼
//! slot 0   slot 1             slot 0           (competing consumers:
//!  │         │                  │               one slot per event)
//!  └────┬────┘                  │
//!       ▼                       ▼
//!  handler.handle(event)   handler.handle(event)
//!       (optionally bounded by a TimeoutSupervisor)
//! ```
//!
//! ### Delivery rules
//! - **FIFO** within one queue; no ordering across queues or event types.
//! - **Fan-out across queues**: one `publish` lands one copy per queue of
//!   the event type.
//! - **Competing consumers within a queue**: N slots race, each event goes
//!   to exactly one slot.
//! - **Advisory timeout**: an overrun unblocks the slot at ≈T and fires the
//!   subscription's `on_timeout` on a detached path; the handler itself is
//!   never killed, its late result is discarded.
//! - **No silent drops**: a full queue grows by one slot instead of
//!   rejecting or overwriting events.
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                        |
//! |-------------------|----------------------------------------------------------|-------------------------------------------|
//! | **Handler API**   | Consume typed events from a slot worker.                 | [`Handler`], [`HandlerFn`], [`HandlerSpec`] |
//! | **Queues**        | Prioritized, growable, individually addressable.         | [`QueueId`], [`Priority`]                 |
//! | **Timeouts**      | Bound the wait per invocation, advisory only.            | [`HandlerSpec::with_timeout`], [`SlotId`] |
//! | **Errors**        | Loud identifier faults, labeled for logs/metrics.        | [`DispatchError`], [`HandlerError`]       |
//! | **Configuration** | Centralize runtime settings.                             | [`DispatcherConfig`]                      |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use eventvisor::{Dispatcher, HandlerSpec, Priority};
//!
//! #[derive(Clone)]
//! struct JobDone {
//!     job_id: u64,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let dispatcher = Dispatcher::default();
//!
//!     // A queue with two workers racing for each event, each invocation
//!     // bounded by 500ms.
//!     let queue = dispatcher.add_queue::<JobDone>(Priority::High).await;
//!     dispatcher
//!         .subscribe_many(queue, 2, |_slot| {
//!             HandlerSpec::from_fn("archiver", |ev: JobDone| async move {
//!                 // archive job `ev.job_id`...
//!                 let _ = ev.job_id;
//!             })
//!             .with_timeout(Duration::from_millis(500))
//!         })
//!         .await
//!         .expect("queue was just created");
//!
//!     assert!(dispatcher.publish(JobDone { job_id: 7 }).await);
//!     let _ = dispatcher.shutdown().await;
//! }
//! ```
//!
//! ## Logging
//! The crate logs through [`tracing`]; with no subscriber installed every
//! call is a no-op and the dispatcher behaves identically.

mod config;
mod dispatcher;
mod error;
mod events;
mod handlers;
mod handling;
mod queue;

// ---- Public re-exports ----

pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, HandlerError};
pub use events::Event;
pub use handlers::{Handler, HandlerFn, HandlerRef, HandlerSpec, TimeoutCallback};
pub use handling::{Priority, QueueId, SlotId};
