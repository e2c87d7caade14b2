//! Thread identifiers and clarification exchanges.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One round of clarification.
///
/// `answers` is `None` until the caller responds, and stays `None` when the
/// round is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswerExchange {
    pub questions: Vec<String>,
    pub answers: Option<Vec<String>>,
    pub skipped: bool,
}

impl QuestionAnswerExchange {
    pub fn pending(questions: Vec<String>) -> Self {
        Self {
            questions,
            answers: None,
            skipped: false,
        }
    }

    /// Still waiting for answers (neither answered nor skipped).
    pub fn is_pending(&self) -> bool {
        self.answers.is_none() && !self.skipped
    }

    /// Question/answer pairs of an answered round.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.questions
            .iter()
            .zip(self.answers.iter().flatten())
            .map(|(q, a)| (q.as_str(), a.as_str()))
    }
}
