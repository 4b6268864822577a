//! # Core handler trait
//!
//! `Handler` is the extension point for consuming events. Each handler
//! instance is driven by one slot worker owned by the handling it was
//! subscribed to; the worker pops events from the shared queue and awaits
//! `handle` for each one.
//!
//! ## Contract
//! - `handle` runs on the slot's worker task (or, with a configured timeout,
//!   on the slot's long-lived execution task). It may be slow; it never
//!   blocks the publisher.
//! - Panics inside `handle` are caught at the slot boundary and logged; the
//!   slot keeps serving subsequent events.
//! - One handler instance attached to one slot is never invoked concurrently
//!   with itself.
//!
//! ## Example (skeleton)
//! ```rust
//! use async_trait::async_trait;
//! use eventvisor::Handler;
//!
//! #[derive(Clone)]
//! struct Tick(u64);
//!
//! struct TickPrinter;
//!
//! #[async_trait]
//! impl Handler<Tick> for TickPrinter {
//!     async fn handle(&self, event: Tick) {
//!         println!("tick {}", event.0);
//!     }
//!     fn name(&self) -> &str {
//!         "tick-printer"
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event handlers.
///
/// Called from a slot-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Handler<E: Event>: Send + Sync + 'static {
    /// Consumes a single event popped for this slot.
    async fn handle(&self, event: E);

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handler handle, as stored by a subscription.
pub type HandlerRef<E> = Arc<dyn Handler<E>>;
