//! Resume path: continue a thread after clarification answers (or a skip).
//!
//! Resuming is split in two so a caller can reject bad requests before
//! spawning a worker: [`ProcessThreadUseCase::begin_resume`] checks the
//! request and claims the thread, [`ProcessThreadUseCase::continue_resume`]
//! does the collaborator work.

use super::{ProcessThreadError, ProcessThreadUseCase};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::thread_repository::RepositoryError;
use crate::ports::validation_gateway::ValidationGateway;
use chrono::Utc;
use rewriter_domain::{
    ProcessingState, Thread, ThreadId, ThreadSnapshot, ThreadStatus, context_augmentation,
};
use std::time::Duration;
use tracing::info;

impl<G, V> ProcessThreadUseCase<G, V>
where
    G: LlmGateway + 'static,
    V: ValidationGateway + 'static,
{
    /// Check a resume request and move the thread to `processing`.
    ///
    /// Nothing is mutated when the request is rejected. The status change
    /// is a compare-and-set, so of two concurrent requests at most one
    /// gets the thread.
    pub fn begin_resume(
        &self,
        id: &ThreadId,
        answers: &[String],
        skipped: bool,
    ) -> Result<Thread, ProcessThreadError> {
        let thread = self.load(id)?;
        if thread.status != ThreadStatus::AwaitingUserInput {
            return Err(ProcessThreadError::InvalidThreadState {
                id: id.clone(),
                expected: ThreadStatus::AwaitingUserInput,
                actual: thread.status,
            });
        }
        thread.check_answers(answers, skipped)?;

        self.repository
            .transition(id, ThreadStatus::AwaitingUserInput, ThreadStatus::Processing)
            .map_err(|e| match e {
                RepositoryError::StatusConflict {
                    id,
                    expected,
                    actual,
                } => ProcessThreadError::InvalidThreadState {
                    id,
                    expected,
                    actual,
                },
                RepositoryError::NotFound(id) => ProcessThreadError::ThreadNotFound(id),
                other => other.into(),
            })
    }

    /// Regenerate with the answers, re-validate, then continue the loop.
    pub async fn continue_resume(
        &self,
        mut thread: Thread,
        answers: Vec<String>,
        skipped: bool,
    ) -> Result<ThreadSnapshot, ProcessThreadError> {
        info!(
            thread_id = %thread.id,
            skipped,
            answers = answers.len(),
            "Resuming thread"
        );
        let outcome = self.regenerate(&mut thread, answers, skipped).await;
        let next = match self.settle(&mut thread, outcome) {
            Ok(next) => next,
            Err(e) => {
                self.abandon(&mut thread, &e);
                return Err(e);
            }
        };
        self.persist(&mut thread)?;
        self.drive(thread, next).await
    }

    /// [`begin_resume`](Self::begin_resume) followed by
    /// [`continue_resume`](Self::continue_resume).
    pub async fn resume(
        &self,
        id: &ThreadId,
        answers: Vec<String>,
        skipped: bool,
    ) -> Result<ThreadSnapshot, ProcessThreadError> {
        let thread = self.begin_resume(id, &answers, skipped)?;
        self.continue_resume(thread, answers, skipped).await
    }

    /// Threads that have been waiting for answers longer than `older_than`.
    pub fn stale_awaiting(&self, older_than: Duration) -> Result<Vec<ThreadId>, ProcessThreadError> {
        let Some(cutoff) = chrono::Duration::from_std(older_than)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return Ok(Vec::new());
        };
        Ok(self.repository.stale_awaiting(cutoff)?)
    }

    async fn regenerate(
        &self,
        thread: &mut Thread,
        answers: Vec<String>,
        skipped: bool,
    ) -> Result<ProcessingState, ProcessThreadError> {
        let exchange = thread.apply_answers(answers, skipped)?;
        let original = thread
            .iterations
            .last()
            .map(|it| it.original_answer.clone())
            .unwrap_or_else(|| thread.current_answer.clone());

        let augmentation = match exchange.answers.as_deref() {
            Some(answers) if !exchange.skipped => {
                Some(context_augmentation(&exchange.questions, answers))
                    .filter(|text| !text.is_empty())
            }
            _ => None,
        };
        // All-blank answers regenerate like a skip.
        let prompt = match &augmentation {
            Some(augmentation) => {
                self.renderer
                    .clarification(&thread.user_prompt, &original, augmentation)
            }
            None => self
                .renderer
                .clarification_skipped(&thread.user_prompt, &original),
        };

        let answer = self.generate(&thread.id, &prompt).await?;
        let report = self
            .validate(&thread.id, &thread.user_prompt, &answer)
            .await?;

        if let Some(iteration) = thread.iterations.last_mut() {
            iteration.rewritten_answer = answer.clone();
            iteration.rewriting_prompt = prompt;
        }
        if let Some(data) = thread.last_clarification_mut() {
            data.context_augmentation = augmentation;
            data.validation_output = Some(report.output);
            data.findings = report.findings.clone();
        }
        thread.current_answer = answer;
        thread.replace_findings(report.output, report.findings);

        Ok(self.after_revalidation(thread))
    }
}
