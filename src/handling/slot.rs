//! # Slot worker: one competing consumer of a handling's queue.
//!
//! Each subscription attaches one slot. A slot is a long-lived tokio task
//! cycling `WAITING → RUNNING → WAITING → … → STOPPED`:
//!
//! ```text
//! loop {
//!   ├─ stop token cancelled?        ─► break (STOPPED)
//!   ├─ pop one event                ─► RUNNING: invoke handler
//!   │     with timeout configured:      hand off to TimeoutSupervisor
//!   │     without:                      run directly on this task
//!   └─ queue empty                  ─► select(cancelled | queue signal)
//!                                       spurious wake → retry pop
//! }
//! ```
//!
//! ## Rules
//! - N slots on one handling share one queue and race for each event through
//!   its mutex; each event reaches exactly one slot.
//! - Handler panics are caught here and logged; the loop continues.
//! - Stop only refuses *new* pops; an in-flight invocation is finished (or,
//!   under a timeout, abandoned to its execution task) before the slot exits.

use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{panic_message, HandlerError};
use crate::events::Event;
use crate::handlers::HandlerSpec;
use crate::handling::supervisor::TimeoutSupervisor;
use crate::handling::{QueueId, SlotId};
use crate::queue::SharedQueue;

/// Spawns one slot worker competing on `queue` until `token` is cancelled.
pub(crate) fn spawn_slot<E: Event>(
    queue_id: QueueId,
    slot: SlotId,
    spec: HandlerSpec<E>,
    queue: Arc<SharedQueue<E>>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let supervisor = match spec.timeout {
            Some(timeout) if !timeout.is_zero() => Some(TimeoutSupervisor::start(
                Arc::clone(&spec.handler),
                timeout,
                spec.on_timeout.clone(),
                slot,
            )),
            Some(_zero) => {
                // A zero deadline is not "wait forever"; the subscription
                // runs un-supervised instead.
                tracing::warn!(
                    queue = %queue_id,
                    slot = %slot,
                    handler = spec.handler_name(),
                    "zero timeout ignored; handler runs without supervision"
                );
                None
            }
            None => None,
        };

        tracing::trace!(queue = %queue_id, slot = %slot, handler = spec.handler_name(), "slot started");

        loop {
            if token.is_cancelled() {
                break;
            }

            let Some(event) = queue.pop().await else {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = queue.wait() => {}
                }
                continue;
            };

            match &supervisor {
                Some(supervisor) => {
                    if let Err(err) = supervisor.invoke(event).await {
                        tracing::warn!(
                            queue = %queue_id,
                            slot = %slot,
                            handler = spec.handler_name(),
                            error = err.as_label(),
                            "{}",
                            err.as_message()
                        );
                    }
                }
                None => {
                    let fut = spec.handler.handle(event);
                    if let Err(payload) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let err = HandlerError::Panicked {
                            message: panic_message(payload.as_ref()),
                        };
                        tracing::error!(
                            queue = %queue_id,
                            slot = %slot,
                            handler = spec.handler_name(),
                            error = err.as_label(),
                            "{}",
                            err.as_message()
                        );
                    }
                }
            }
        }

        tracing::trace!(queue = %queue_id, slot = %slot, "slot stopped");
    })
}
