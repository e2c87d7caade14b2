//! Rewrite parameters — use case loop control.
//!
//! [`RewriteParams`] groups the static parameters that control the rewrite
//! loop in [`ProcessThreadUseCase`](crate::use_cases::process_thread::ProcessThreadUseCase)
//! and the clarification timeout sweep. These are application-layer
//! concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rewrite loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteParams {
    /// Maximum number of rewrite attempts per thread. The initial answer
    /// does not count against it.
    pub max_iterations: usize,
    /// How long a thread may wait for clarification answers before it is
    /// resumed as if the user skipped.
    pub awaiting_input_timeout: Duration,
    /// How often the timeout sweep runs.
    pub sweep_interval: Duration,
}

impl Default for RewriteParams {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            awaiting_input_timeout: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl RewriteParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_awaiting_input_timeout(mut self, timeout: Duration) -> Self {
        self.awaiting_input_timeout = timeout;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = RewriteParams::default();
        assert_eq!(params.max_iterations, 5);
        assert_eq!(params.awaiting_input_timeout, Duration::from_secs(600));
        assert_eq!(params.sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_builder() {
        let params = RewriteParams::default()
            .with_max_iterations(2)
            .with_awaiting_input_timeout(Duration::from_secs(30))
            .with_sweep_interval(Duration::from_secs(5));
        assert_eq!(params.max_iterations, 2);
        assert_eq!(params.awaiting_input_timeout, Duration::from_secs(30));
        assert_eq!(params.sweep_interval, Duration::from_secs(5));
    }
}
