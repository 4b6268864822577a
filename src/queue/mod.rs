//! Pending-event storage: growable ring buffer and its shared wrapper.

mod ring;
mod shared;

pub(crate) use shared::SharedQueue;
