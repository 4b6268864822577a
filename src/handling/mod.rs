//! The handling layer: ids, priority, the slot worker loop, the timeout
//! supervisor, and the [`Handling`] aggregate itself.

mod core;
mod id;
mod priority;
mod slot;
mod supervisor;

pub use id::{QueueId, SlotId};
pub use priority::Priority;

pub(crate) use self::core::Handling;
