//! The dispatch facade and its per-event-type registries.

mod core;
mod registry;

pub use self::core::Dispatcher;
