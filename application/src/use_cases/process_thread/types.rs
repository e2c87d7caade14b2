//! Type definitions for the ProcessThread use case.

use crate::ports::llm_gateway::GatewayError;
use crate::ports::thread_repository::RepositoryError;
use crate::ports::validation_gateway::ValidationError;
use rewriter_domain::{DomainError, ThreadId, ThreadStatus};
use thiserror::Error;

/// Final response of a thread the validator declined to analyse.
pub const TOO_COMPLEX_MESSAGE: &str = "Your request is too complex for the automated reasoning system to handle. Please try simplifying your question or breaking it into smaller parts.";

/// Warning attached to a valid answer that the policy only partly covers.
pub const NOT_COVERED_WARNING: &str = "Note: This response could not be fully validated by the automated reasoning system. Some aspects of your question may not be covered by the validation policy.";

/// Warning attached when the rewrite budget runs out.
pub fn budget_warning(max_iterations: usize) -> String {
    format!(
        "Warning: This response may be unsafe. The system reached the maximum iteration limit ({}) while attempting to validate the response. Please review the response carefully.",
        max_iterations
    )
}

/// Errors that can occur while processing or resuming a thread
///
/// Generation and validation failures never reach the caller of the state
/// loop: they are recorded on the thread, which then ends in `error`.
#[derive(Error, Debug)]
pub enum ProcessThreadError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(ThreadId),

    #[error("Thread {id} is {actual}, expected {expected}")]
    InvalidThreadState {
        id: ThreadId,
        expected: ThreadStatus,
        actual: ThreadStatus,
    },

    #[error("Thread {0} has no pending clarification")]
    NotAwaitingClarification(ThreadId),

    #[error("Answer count ({actual}) does not match question count ({expected})")]
    AnswerCountMismatch { expected: usize, actual: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] GatewayError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ProcessThreadError {
    /// Errors caused by the request rather than by a collaborator.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ProcessThreadError::ThreadNotFound(_)
                | ProcessThreadError::InvalidThreadState { .. }
                | ProcessThreadError::NotAwaitingClarification(_)
                | ProcessThreadError::AnswerCountMismatch { .. }
                | ProcessThreadError::InvalidRequest(_)
        )
    }

    /// Failures that terminate the thread with status `error`.
    pub(crate) fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            ProcessThreadError::Generation(_) | ProcessThreadError::Validation(_)
        )
    }
}

impl From<DomainError> for ProcessThreadError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::AnswerCountMismatch { expected, actual } => {
                ProcessThreadError::AnswerCountMismatch { expected, actual }
            }
            DomainError::NoPendingClarification(id) => {
                ProcessThreadError::NotAwaitingClarification(ThreadId::new(id))
            }
            other => ProcessThreadError::InvalidRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_warning_mentions_limit() {
        let warning = budget_warning(5);
        assert!(warning.starts_with("Warning: This response may be unsafe."));
        assert!(warning.contains("maximum iteration limit (5)"));
    }

    #[test]
    fn test_domain_error_conversion() {
        let err: ProcessThreadError = DomainError::AnswerCountMismatch {
            expected: 2,
            actual: 1,
        }
        .into();
        assert!(matches!(
            err,
            ProcessThreadError::AnswerCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert!(err.is_caller_error());

        let err: ProcessThreadError = DomainError::EmptyPrompt.into();
        assert!(matches!(err, ProcessThreadError::InvalidRequest(_)));
    }

    #[test]
    fn test_collaborator_failures() {
        assert!(ProcessThreadError::Generation(GatewayError::Timeout).is_collaborator_failure());
        assert!(
            ProcessThreadError::Validation(ValidationError::Malformed("x".into()))
                .is_collaborator_failure()
        );
        assert!(
            !ProcessThreadError::ThreadNotFound(ThreadId::new("t")).is_collaborator_failure()
        );
    }
}
