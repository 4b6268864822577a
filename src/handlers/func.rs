//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(E) -> Fut`, producing a fresh future
//! per event. This avoids shared mutable state inside the handler; if shared
//! state is needed, capture an `Arc<...>` explicitly in the closure.
//!
//! ## Example
//! ```rust
//! use eventvisor::{HandlerFn, HandlerRef};
//!
//! #[derive(Clone)]
//! struct Ping;
//!
//! let h: HandlerRef<Ping> = HandlerFn::arc("ping", |_ev: Ping| async move {
//!     // do work...
//! });
//!
//! assert_eq!(h.name(), "ping");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Event;
use crate::handlers::handler::Handler;

/// Function-backed handler implementation.
///
/// Wraps a closure that *creates* a new future per event.
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a
    /// [`HandlerRef`](crate::HandlerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<E, F, Fut> Handler<E> for HandlerFn<F>
where
    E: Event,
    F: Fn(E) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, event: E) {
        (self.f)(event).await;
    }

    fn name(&self) -> &str {
        &self.name
    }
}
