//! Rewrite loop configuration from TOML (`[rewrite]` section)

use rewriter_application::RewriteParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw rewrite loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRewriteConfig {
    /// Rewrite attempts per thread (the initial answer is free)
    pub max_iterations: usize,
    /// Seconds a thread may wait for clarification answers
    pub awaiting_input_timeout_secs: u64,
    /// Seconds between timeout sweeps
    pub sweep_interval_secs: u64,
}

impl Default for FileRewriteConfig {
    fn default() -> Self {
        let params = RewriteParams::default();
        Self {
            max_iterations: params.max_iterations,
            awaiting_input_timeout_secs: params.awaiting_input_timeout.as_secs(),
            sweep_interval_secs: params.sweep_interval.as_secs(),
        }
    }
}

impl FileRewriteConfig {
    pub fn to_params(&self) -> RewriteParams {
        RewriteParams::default()
            .with_max_iterations(self.max_iterations)
            .with_awaiting_input_timeout(Duration::from_secs(self.awaiting_input_timeout_secs))
            .with_sweep_interval(Duration::from_secs(self.sweep_interval_secs.max(1)))
    }
}
