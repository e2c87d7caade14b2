//! Background sweep that resumes threads stuck awaiting clarification.

use crate::config::RewriteParams;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::validation_gateway::ValidationGateway;
use crate::use_cases::rewrite_service::RewriteService;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Every `interval`, force-skips threads that have waited longer than
/// `timeout` for answers. Stops when the token is cancelled.
pub struct AwaitingInputSweeper<G: LlmGateway + 'static, V: ValidationGateway + 'static> {
    service: RewriteService<G, V>,
    interval: Duration,
    timeout: Duration,
    cancellation_token: CancellationToken,
}

impl<G, V> AwaitingInputSweeper<G, V>
where
    G: LlmGateway + 'static,
    V: ValidationGateway + 'static,
{
    pub fn new(
        service: RewriteService<G, V>,
        params: &RewriteParams,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            service,
            interval: params.sweep_interval,
            timeout: params.awaiting_input_timeout,
            cancellation_token,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        info!(
            interval_secs = self.interval.as_secs(),
            timeout_secs = self.timeout.as_secs(),
            "Clarification timeout sweeper started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = self.cancellation_token.cancelled() => break,
                _ = ticker.tick() => self.sweep_once(),
            }
        }
        info!("Clarification timeout sweeper stopped");
    }

    fn sweep_once(&self) {
        if let Err(e) = self.service.skip_stale(self.timeout) {
            warn!(error = %e, "Clarification timeout sweep failed");
        }
    }
}
