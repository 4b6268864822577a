//! Handler surface: the [`Handler`] trait, the closure adapter, and the
//! per-subscription [`HandlerSpec`].

mod func;
mod handler;
mod spec;

pub use func::HandlerFn;
pub use handler::{Handler, HandlerRef};
pub use spec::{HandlerSpec, TimeoutCallback};
