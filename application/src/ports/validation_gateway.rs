//! Validation gateway port
//!
//! Defines the interface for checking a candidate answer against a formal
//! policy. The adapter turns the backend's response into a
//! [`ValidationReport`]; findings come back raw (not yet enriched).

use async_trait::async_trait;
use rewriter_domain::ValidationReport;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Validation request failed: {0}")]
    RequestFailed(String),

    #[error("Validation request throttled: {0}")]
    Throttled(String),

    #[error("Validation service unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed validation response: {0}")]
    Malformed(String),

    #[error("Validation timed out")]
    Timeout,
}

impl ValidationError {
    /// Whether an adapter may retry the call.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ValidationError::Throttled(_) | ValidationError::Unavailable(_) | ValidationError::Timeout
        )
    }
}

#[async_trait]
pub trait ValidationGateway: Send + Sync {
    /// Validate `answer` as a reply to `prompt`.
    async fn validate(&self, prompt: &str, answer: &str)
    -> Result<ValidationReport, ValidationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_is_not_transient() {
        assert!(!ValidationError::Malformed("no findings".to_string()).is_transient());
        assert!(ValidationError::Unavailable("503".to_string()).is_transient());
    }
}
