//! # Timeout supervisor: bound the wait, not the execution.
//!
//! [`TimeoutSupervisor`] wraps handler invocations for one slot when a
//! timeout was configured at subscription time. It owns a **long-lived**
//! execution task (one per supervised slot, never one per call) and bounds
//! the slot-side wait for each invocation with [`tokio::time::timeout`].
//!
//! ## Architecture
//! ```text
//! slot loop ── invoke(event) ──► mpsc ──► execution task ── handler.handle(event)
//!     │                                         │
//!     └── wait_for(timeout) on oneshot ◄── done ┘
//!
//! deadline exceeded:
//!     slot returns Timeout immediately ──► tokio::spawn(on_timeout(slot))   (detached)
//!     execution task keeps running; its completion signal lands on a
//!     dropped oneshot receiver and is discarded
//! ```
//!
//! ## Rules
//! - The slot's drain loop is never blocked by a still-running handler.
//! - A late completion is discarded silently; no crash, no double-report.
//! - While the execution task is wedged, each subsequent `invoke` times out
//!   on the hand-off itself — the overrun stays visible instead of silently
//!   stalling the slot.
//! - Handler panics are caught on the execution task and logged; the task
//!   keeps serving invocations.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time;

use crate::error::{panic_message, HandlerError};
use crate::events::Event;
use crate::handlers::{HandlerRef, TimeoutCallback};
use crate::handling::SlotId;

/// One supervised invocation: the event plus its completion signal.
struct Job<E> {
    event: E,
    done: oneshot::Sender<()>,
}

/// Bounds the slot-side wait around handler invocations for one slot.
///
/// Dropping the supervisor closes the channel; the execution task drains and
/// exits on its own. A handler wedged mid-call finishes on its own time
/// (non-preemptive), after which the task unwinds.
pub(crate) struct TimeoutSupervisor<E> {
    tx: mpsc::Sender<Job<E>>,
    timeout: Duration,
    on_timeout: Option<TimeoutCallback>,
    slot: SlotId,
}

impl<E: Event> TimeoutSupervisor<E> {
    /// Spawns the execution task and returns the supervisor handle.
    pub(crate) fn start(
        handler: HandlerRef<E>,
        timeout: Duration,
        on_timeout: Option<TimeoutCallback>,
        slot: SlotId,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<Job<E>>(1);

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let fut = handler.handle(job.event);
                if let Err(payload) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                    let err = HandlerError::Panicked {
                        message: panic_message(payload.as_ref()),
                    };
                    tracing::error!(
                        handler = handler.name(),
                        error = err.as_label(),
                        "{}",
                        err.as_message()
                    );
                }
                // Receiver may be gone if the invocation already timed out.
                let _ = job.done.send(());
            }
        });

        Self {
            tx,
            timeout,
            on_timeout,
            slot,
        }
    }

    /// Runs one invocation, waiting at most the configured timeout.
    ///
    /// The deadline covers the hand-off to the execution task as well, so a
    /// wedged handler surfaces as a timeout for every subsequent event.
    pub(crate) async fn invoke(&self, event: E) -> Result<(), HandlerError> {
        let (done_tx, done_rx) = oneshot::channel();
        let job = Job {
            event,
            done: done_tx,
        };

        let handed_off_and_done = async {
            if self.tx.send(job).await.is_err() {
                // Execution task is gone; nothing will ever complete.
                return;
            }
            let _ = done_rx.await;
        };

        match time::timeout(self.timeout, handed_off_and_done).await {
            Ok(()) => Ok(()),
            Err(_elapsed) => {
                self.fire_on_timeout();
                Err(HandlerError::Timeout {
                    timeout: self.timeout,
                })
            }
        }
    }

    /// Fires the timeout callback on a detached task.
    fn fire_on_timeout(&self) {
        if let Some(callback) = &self.on_timeout {
            let callback = Arc::clone(callback);
            let slot = self.slot;
            tokio::spawn(async move {
                callback(slot);
            });
        }
    }
}
