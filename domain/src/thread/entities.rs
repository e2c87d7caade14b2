//! Thread record, status and iteration log.

use super::value_objects::{QuestionAnswerExchange, ThreadId};
use crate::core::error::DomainError;
use crate::finding::{Finding, ValidationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle status of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Processing,
    AwaitingUserInput,
    Completed,
    Error,
}

impl ThreadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadStatus::Processing => "processing",
            ThreadStatus::AwaitingUserInput => "awaiting_user_input",
            ThreadStatus::Completed => "completed",
            ThreadStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ThreadStatus::Completed | ThreadStatus::Error)
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the generation service decided during an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LlmDecision {
    Initial,
    Rewrite,
    AskQuestions,
    Impossible,
}

impl LlmDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmDecision::Initial => "INITIAL",
            LlmDecision::Rewrite => "REWRITE",
            LlmDecision::AskQuestions => "ASK_QUESTIONS",
            LlmDecision::Impossible => "IMPOSSIBLE",
        }
    }
}

impl fmt::Display for LlmDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data of an iteration driven by validation feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArFeedback {
    pub findings: Vec<Finding>,
    pub validation_output: ValidationKind,
    pub processed_finding_index: Option<usize>,
    pub llm_decision: LlmDecision,
}

/// Data of an iteration that paused for user clarification.
///
/// The answer half (`qa_exchange.answers`, `context_augmentation`,
/// `validation_output`, `findings`) is filled in once, on resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clarification {
    pub qa_exchange: QuestionAnswerExchange,
    pub context_augmentation: Option<String>,
    pub processed_finding_index: Option<usize>,
    pub llm_decision: LlmDecision,
    pub validation_output: Option<ValidationKind>,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "iteration_type", rename_all = "snake_case")]
pub enum IterationKind {
    ArFeedback(ArFeedback),
    UserClarification(Clarification),
}

/// One entry of the thread's append-only iteration log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Iteration {
    /// Position in the log; 0 is the initial answer.
    pub number: usize,
    pub original_answer: String,
    pub rewritten_answer: String,
    pub rewriting_prompt: String,
    #[serde(flatten)]
    pub kind: IterationKind,
}

impl Iteration {
    pub fn is_clarification(&self) -> bool {
        matches!(self.kind, IterationKind::UserClarification(_))
    }

    pub fn validation_output(&self) -> Option<ValidationKind> {
        match &self.kind {
            IterationKind::ArFeedback(data) => Some(data.validation_output),
            IterationKind::UserClarification(data) => data.validation_output,
        }
    }

    pub fn llm_decision(&self) -> LlmDecision {
        match &self.kind {
            IterationKind::ArFeedback(data) => data.llm_decision,
            IterationKind::UserClarification(data) => data.llm_decision,
        }
    }
}

/// The unit of work: one user prompt and everything done to answer it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub user_prompt: String,
    pub model_id: String,
    pub status: ThreadStatus,
    pub iterations: Vec<Iteration>,
    /// Rewrite attempts made so far; never exceeds `max_iterations`.
    pub iteration_counter: usize,
    pub max_iterations: usize,
    /// The latest candidate answer.
    pub current_answer: String,
    pub current_output: Option<ValidationKind>,
    pub current_findings: Vec<Finding>,
    /// Indices into `current_findings` already handed to a rewrite.
    #[serde(default)]
    pub processed_findings: BTreeSet<usize>,
    pub all_clarifications: Vec<QuestionAnswerExchange>,
    #[serde(default)]
    pub iteration_summaries: Vec<String>,
    pub final_response: Option<String>,
    pub warning_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub awaiting_input_since: Option<DateTime<Utc>>,
}

impl Thread {
    pub fn new(
        user_prompt: impl Into<String>,
        model_id: impl Into<String>,
        max_iterations: usize,
    ) -> Result<Self, DomainError> {
        let user_prompt = user_prompt.into();
        if user_prompt.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        Ok(Self {
            id: ThreadId::generate(),
            user_prompt,
            model_id: model_id.into(),
            status: ThreadStatus::Processing,
            iterations: Vec::new(),
            iteration_counter: 0,
            max_iterations,
            current_answer: String::new(),
            current_output: None,
            current_findings: Vec::new(),
            processed_findings: BTreeSet::new(),
            all_clarifications: Vec::new(),
            iteration_summaries: Vec::new(),
            final_response: None,
            warning_message: None,
            created_at: Utc::now(),
            completed_at: None,
            awaiting_input_since: None,
        })
    }

    /// Append an iteration, numbering it by its position in the log.
    pub fn push_iteration(
        &mut self,
        original_answer: impl Into<String>,
        rewritten_answer: impl Into<String>,
        rewriting_prompt: impl Into<String>,
        kind: IterationKind,
    ) -> usize {
        let number = self.iterations.len();
        self.iterations.push(Iteration {
            number,
            original_answer: original_answer.into(),
            rewritten_answer: rewritten_answer.into(),
            rewriting_prompt: rewriting_prompt.into(),
            kind,
        });
        number
    }

    pub fn budget_exhausted(&self) -> bool {
        self.iteration_counter >= self.max_iterations
    }

    /// Replace the unresolved finding set with a fresh validation result.
    pub fn replace_findings(&mut self, output: ValidationKind, findings: Vec<Finding>) {
        self.current_output = Some(output);
        self.current_findings = findings;
        self.processed_findings.clear();
    }

    pub fn set_status(&mut self, status: ThreadStatus) {
        self.status = status;
        match status {
            ThreadStatus::AwaitingUserInput => self.awaiting_input_since = Some(Utc::now()),
            ThreadStatus::Processing => self.awaiting_input_since = None,
            ThreadStatus::Completed | ThreadStatus::Error => {
                self.awaiting_input_since = None;
                self.completed_at = Some(Utc::now());
            }
        }
    }

    pub fn complete(&mut self, response: impl Into<String>, warning: Option<String>) {
        self.final_response = Some(response.into());
        self.warning_message = warning;
        self.set_status(ThreadStatus::Completed);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.final_response = Some(message.into());
        self.set_status(ThreadStatus::Error);
    }

    /// The clarification iteration still waiting for answers, if any.
    pub fn pending_clarification(&self) -> Option<&Clarification> {
        match self.iterations.last().map(|it| &it.kind) {
            Some(IterationKind::UserClarification(data)) if data.qa_exchange.is_pending() => {
                Some(data)
            }
            _ => None,
        }
    }

    /// Check that `answers` can resolve the pending clarification.
    ///
    /// Does not look at `status`; callers gate on that separately.
    pub fn check_answers(&self, answers: &[String], skipped: bool) -> Result<(), DomainError> {
        let pending = self
            .pending_clarification()
            .ok_or_else(|| DomainError::NoPendingClarification(self.id.to_string()))?;
        let expected = pending.qa_exchange.questions.len();
        if !skipped && answers.len() != expected {
            return Err(DomainError::AnswerCountMismatch {
                expected,
                actual: answers.len(),
            });
        }
        Ok(())
    }

    /// Record answers (or a skip) on the pending clarification.
    ///
    /// Returns the completed exchange. Answered rounds are also appended to
    /// `all_clarifications`.
    pub fn apply_answers(
        &mut self,
        answers: Vec<String>,
        skipped: bool,
    ) -> Result<QuestionAnswerExchange, DomainError> {
        self.check_answers(&answers, skipped)?;
        let id = self.id.to_string();
        let data = self
            .last_clarification_mut()
            .ok_or(DomainError::NoPendingClarification(id))?;
        data.qa_exchange.answers = (!skipped).then_some(answers);
        data.qa_exchange.skipped = skipped;
        let exchange = data.qa_exchange.clone();
        if !skipped {
            self.all_clarifications.push(exchange.clone());
        }
        Ok(exchange)
    }

    pub fn last_clarification_mut(&mut self) -> Option<&mut Clarification> {
        match self.iterations.last_mut().map(|it| &mut it.kind) {
            Some(IterationKind::UserClarification(data)) => Some(data),
            _ => None,
        }
    }

    /// Questions the caller must answer, while the thread is paused.
    pub fn pending_questions(&self) -> Option<&[String]> {
        if self.status != ThreadStatus::AwaitingUserInput {
            return None;
        }
        self.pending_clarification()
            .map(|data| data.qa_exchange.questions.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread() -> Thread {
        Thread::new("Do contractors need clearance?", "model-x", 5).unwrap()
    }

    fn pause(thread: &mut Thread, questions: &[&str]) {
        let exchange =
            QuestionAnswerExchange::pending(questions.iter().map(|q| q.to_string()).collect());
        thread.push_iteration(
            "answer",
            "",
            "",
            IterationKind::UserClarification(Clarification {
                qa_exchange: exchange,
                context_augmentation: None,
                processed_finding_index: None,
                llm_decision: LlmDecision::AskQuestions,
                validation_output: None,
                findings: vec![],
            }),
        );
        thread.set_status(ThreadStatus::AwaitingUserInput);
    }

    #[test]
    fn test_new_rejects_empty_prompt() {
        assert!(matches!(
            Thread::new("   ", "m", 5),
            Err(DomainError::EmptyPrompt)
        ));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ThreadStatus::AwaitingUserInput).unwrap(),
            "\"awaiting_user_input\""
        );
        assert!(ThreadStatus::Completed.is_terminal());
        assert!(!ThreadStatus::AwaitingUserInput.is_terminal());
    }

    #[test]
    fn test_status_timestamps() {
        let mut t = thread();
        pause(&mut t, &["Q?"]);
        assert!(t.awaiting_input_since.is_some());

        t.set_status(ThreadStatus::Processing);
        assert!(t.awaiting_input_since.is_none());

        t.complete("done", None);
        assert!(t.completed_at.is_some());
        assert_eq!(t.final_response.as_deref(), Some("done"));
    }

    #[test]
    fn test_iteration_numbers_follow_position() {
        let mut t = thread();
        let kind = IterationKind::ArFeedback(ArFeedback {
            findings: vec![],
            validation_output: ValidationKind::Valid,
            processed_finding_index: None,
            llm_decision: LlmDecision::Initial,
        });
        assert_eq!(t.push_iteration("", "a", "p", kind.clone()), 0);
        assert_eq!(t.push_iteration("a", "b", "p", kind), 1);
        assert_eq!(t.iterations[1].number, 1);
    }

    #[test]
    fn test_check_answers_count_mismatch() {
        let mut t = thread();
        pause(&mut t, &["Q1?", "Q2?"]);

        let err = t.check_answers(&["only one".to_string()], false).unwrap_err();
        assert!(matches!(
            err,
            DomainError::AnswerCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
        // Skipping ignores the count
        assert!(t.check_answers(&[], true).is_ok());
    }

    #[test]
    fn test_check_answers_without_pending_clarification() {
        let t = thread();
        assert!(matches!(
            t.check_answers(&[], true),
            Err(DomainError::NoPendingClarification(_))
        ));
    }

    #[test]
    fn test_apply_answers_records_exchange() {
        let mut t = thread();
        pause(&mut t, &["Q1?", "Q2?"]);

        let exchange = t
            .apply_answers(vec!["A1".to_string(), "A2".to_string()], false)
            .unwrap();
        assert_eq!(exchange.answers.as_ref().unwrap().len(), 2);
        assert_eq!(t.all_clarifications.len(), 1);
        assert!(t.pending_clarification().is_none());
    }

    #[test]
    fn test_apply_skip_keeps_answers_empty() {
        let mut t = thread();
        pause(&mut t, &["Q1?"]);

        let exchange = t.apply_answers(vec![], true).unwrap();
        assert!(exchange.skipped);
        assert!(exchange.answers.is_none());
        assert!(t.all_clarifications.is_empty());
    }

    #[test]
    fn test_pending_questions_only_while_awaiting() {
        let mut t = thread();
        pause(&mut t, &["Q1?"]);
        assert_eq!(t.pending_questions().unwrap(), ["Q1?".to_string()]);

        t.set_status(ThreadStatus::Processing);
        assert!(t.pending_questions().is_none());
    }

    #[test]
    fn test_iteration_serializes_flat_with_type_tag() {
        let mut t = thread();
        pause(&mut t, &["Q?"]);
        let json = serde_json::to_value(&t.iterations[0]).unwrap();
        assert_eq!(json["iteration_type"], "user_clarification");
        assert_eq!(json["number"], 0);
        assert!(json["qa_exchange"]["answers"].is_null());

        let back: Iteration = serde_json::from_value(json).unwrap();
        assert!(back.is_clarification());
    }
}
