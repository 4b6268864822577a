//! # Subscription specification (`HandlerSpec`)
//!
//! [`HandlerSpec`] bundles everything one subscription carries: the handler
//! itself, an optional per-invocation timeout, and an optional callback fired
//! when that timeout is exceeded. The dispatcher consumes one spec per slot.
//!
//! ## Timeout semantics
//! - With a timeout, the slot hands each event to a long-lived execution
//!   task and bounds its own wait; an overrun unblocks the slot and fires
//!   `on_timeout` on a detached path. The handler itself is never killed.
//! - Without a timeout, the handler runs directly on the slot's worker task.
//! - A **zero** duration is not a "wait forever" escape hatch; it is ignored
//!   at slot start (logged) and the handler runs un-supervised.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use eventvisor::HandlerSpec;
//!
//! #[derive(Clone)]
//! struct Job(u32);
//!
//! let spec = HandlerSpec::from_fn("job", |_ev: Job| async move {
//!     // do work...
//! })
//! .with_timeout(Duration::from_millis(500))
//! .with_on_timeout(|slot| eprintln!("{slot} overran"));
//! # let _ = spec;
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::events::Event;
use crate::handlers::func::HandlerFn;
use crate::handlers::handler::HandlerRef;
use crate::handling::SlotId;

/// Callback invoked (detached) when a supervised invocation overruns.
pub type TimeoutCallback = Arc<dyn Fn(SlotId) + Send + Sync>;

/// Per-subscription bundle: handler, optional timeout, optional callback.
#[derive(Clone)]
pub struct HandlerSpec<E: Event> {
    pub(crate) handler: HandlerRef<E>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) on_timeout: Option<TimeoutCallback>,
}

impl<E: Event> HandlerSpec<E> {
    /// Creates a spec with no timeout supervision.
    pub fn new(handler: HandlerRef<E>) -> Self {
        Self {
            handler,
            timeout: None,
            on_timeout: None,
        }
    }

    /// Creates a spec around a closure, named for logs.
    ///
    /// Shorthand for `HandlerSpec::new(HandlerFn::arc(name, f))`.
    pub fn from_fn<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::new(HandlerFn::arc(name, f))
    }

    /// Bounds the slot-side wait for each invocation to `timeout`.
    ///
    /// Advisory only: an overrunning handler keeps executing on its
    /// execution task, its eventual result is discarded.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Registers a callback fired when an invocation overruns its timeout.
    ///
    /// Runs on a detached task so it can never block the slot's drain loop.
    #[must_use]
    pub fn with_on_timeout(mut self, callback: impl Fn(SlotId) + Send + Sync + 'static) -> Self {
        self.on_timeout = Some(Arc::new(callback));
        self
    }

    /// The wrapped handler's name, for logs.
    pub fn handler_name(&self) -> &str {
        self.handler.name()
    }
}
