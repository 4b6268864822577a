//! Error types used by the dispatcher facade and the slot workers.
//!
//! This module defines two main error enums:
//!
//! - [`DispatchError`] — errors raised by the dispatch facade itself
//!   (unknown ids, unregistered event types, stopped queues, shutdown).
//! - [`HandlerError`] — errors raised around individual handler invocations
//!   (advisory timeout, caught panic).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use std::time::Duration;

use thiserror::Error;

use crate::handling::QueueId;

/// # Errors produced by the dispatch facade.
///
/// Identifier and lifecycle faults are surfaced loudly: an unknown
/// [`QueueId`] is always an error, never a silent zero/default.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No handling with this id exists for the addressed event type.
    #[error("unknown queue id {id}")]
    UnknownQueue {
        /// The id that was never handed out (or already removed).
        id: QueueId,
    },

    /// No queue was ever created for this event type.
    #[error("no queues registered for event type {type_name}")]
    TypeNotRegistered {
        /// `std::any::type_name` of the event type.
        type_name: &'static str,
    },

    /// The addressed handling has been stopped; it no longer accepts events.
    #[error("queue {id} is stopped")]
    QueueStopped {
        /// Id of the stopped handling.
        id: QueueId,
    },

    /// Shutdown grace period was exceeded; some slots were still draining.
    #[error("shutdown grace {grace:?} exceeded; stuck queues: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Ids of handlings whose slots had not finished joining.
        stuck: Vec<QueueId>,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::UnknownQueue { .. } => "dispatch_unknown_queue",
            DispatchError::TypeNotRegistered { .. } => "dispatch_type_not_registered",
            DispatchError::QueueStopped { .. } => "dispatch_queue_stopped",
            DispatchError::GraceExceeded { .. } => "dispatch_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::UnknownQueue { id } => format!("unknown queue: {id}"),
            DispatchError::TypeNotRegistered { type_name } => {
                format!("type not registered: {type_name}")
            }
            DispatchError::QueueStopped { id } => format!("queue stopped: {id}"),
            DispatchError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck queues={stuck:?}")
            }
        }
    }
}

/// # Errors produced around a single handler invocation.
///
/// Both variants are non-fatal for the slot: they are logged and the slot
/// returns to waiting for the next event.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The slot-side wait exceeded the configured timeout.
    ///
    /// Advisory: the handler keeps executing, its result is discarded.
    #[error("invocation timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The handler panicked; the panic was caught at the slot boundary.
    #[error("handler panicked: {message}")]
    Panicked {
        /// Downcast panic payload, best effort.
        message: String,
    },
}

impl HandlerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Timeout { .. } => "handler_timeout",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            HandlerError::Panicked { message } => format!("panic: {message}"),
        }
    }
}

/// Renders a caught panic payload for logs.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let err = DispatchError::UnknownQueue { id: QueueId::next() };
        assert_eq!(err.as_label(), "dispatch_unknown_queue");

        let err = HandlerError::Timeout {
            timeout: Duration::from_secs(1),
        };
        assert_eq!(err.as_label(), "handler_timeout");
    }

    #[test]
    fn test_panic_message_downcasts() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(payload.as_ref()), "kaboom");
    }
}
