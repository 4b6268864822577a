//! # Dispatcher configuration.
//!
//! [`DispatcherConfig`] centralizes runtime settings: the initial ring
//! capacity queues start with, and the grace bound on the shutdown drain.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use eventvisor::DispatcherConfig;
//!
//! let mut cfg = DispatcherConfig::default();
//! cfg.initial_capacity = 64;
//! cfg.grace = Duration::from_secs(10);
//!
//! assert_eq!(cfg.initial_capacity, 64);
//! ```

use std::time::Duration;

/// Global configuration for a dispatcher instance.
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Ring capacity each new queue starts with (grows by one when full).
    pub initial_capacity: usize,
    /// Maximum time `shutdown` waits for slot workers to join before
    /// reporting the stragglers and returning.
    pub grace: Duration,
}

impl Default for DispatcherConfig {
    /// Provides a default configuration:
    /// - `initial_capacity = 16`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            grace: Duration::from_secs(5),
        }
    }
}
