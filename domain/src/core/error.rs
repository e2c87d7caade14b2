//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Answer count ({actual}) does not match question count ({expected})")]
    AnswerCountMismatch { expected: usize, actual: usize },

    #[error("Thread {0} has no clarification awaiting answers")]
    NoPendingClarification(String),
}

impl DomainError {
    /// Whether the caller can fix this by sending different input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyPrompt | DomainError::AnswerCountMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_count_mismatch_display() {
        let error = DomainError::AnswerCountMismatch {
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            error.to_string(),
            "Answer count (1) does not match question count (2)"
        );
    }

    #[test]
    fn test_is_input_error() {
        assert!(DomainError::EmptyPrompt.is_input_error());
        assert!(!DomainError::NoPendingClarification("t".to_string()).is_input_error());
    }
}
