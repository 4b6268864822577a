//! # Event marker trait.
//!
//! The dispatcher routes values by their static type: every `publish::<E>`
//! only reaches queues created for `E`. Any clonable, sendable, `'static`
//! value qualifies — application code does not implement anything by hand,
//! the blanket impl covers it.
//!
//! Cloning happens once per receiving queue on broadcast (fan-out across
//! handlings); within one queue an event is moved, never copied.
//!
//! ## Example
//! ```rust
//! use eventvisor::Event;
//!
//! #[derive(Clone, Debug)]
//! struct OrderPlaced {
//!     order_id: u64,
//! }
//!
//! fn assert_event<E: Event>() {}
//! assert_event::<OrderPlaced>();
//! ```

/// Marker for dispatchable event types.
///
/// Blanket-implemented for every `Clone + Send + 'static` type; the bounds
/// exist because broadcast clones the event per target queue and slot workers
/// run on a multi-threaded runtime.
pub trait Event: Clone + Send + 'static {}

impl<T: Clone + Send + 'static> Event for T {}
