//! LLM Gateway port
//!
//! Defines the interface for obtaining text from a generation service.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request throttled: {0}")]
    Throttled(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Whether an adapter may retry the call.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::ConnectionError(_) | GatewayError::Throttled(_) | GatewayError::Timeout
        )
    }
}

/// Gateway for LLM communication
///
/// The orchestrator treats generation as a single prompt-in, text-out call.
/// Implementations (adapters) live in the infrastructure layer; retries, if
/// any, happen there.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Identifier of the model answering prompts (recorded on threads).
    fn model_id(&self) -> &str;

    /// Send one prompt and return the model's full reply.
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}
