//! Rewrite service: the surface callers use to submit and answer threads.
//!
//! `submit` and `submit_answers` return as soon as the request is accepted
//! and leave the work to a background task; `run` and `answer` await it.

use crate::ports::llm_gateway::LlmGateway;
use crate::ports::validation_gateway::ValidationGateway;
use crate::use_cases::process_thread::{ProcessThreadError, ProcessThreadUseCase};
use rewriter_domain::{ThreadId, ThreadSnapshot};
use std::time::Duration;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

pub struct RewriteService<G: LlmGateway + 'static, V: ValidationGateway + 'static> {
    use_case: ProcessThreadUseCase<G, V>,
    tasks: TaskTracker,
}

impl<G, V> Clone for RewriteService<G, V>
where
    G: LlmGateway + 'static,
    V: ValidationGateway + 'static,
{
    fn clone(&self) -> Self {
        Self {
            use_case: self.use_case.clone(),
            tasks: self.tasks.clone(),
        }
    }
}

impl<G, V> RewriteService<G, V>
where
    G: LlmGateway + 'static,
    V: ValidationGateway + 'static,
{
    pub fn new(use_case: ProcessThreadUseCase<G, V>) -> Self {
        Self {
            use_case,
            tasks: TaskTracker::new(),
        }
    }

    pub fn use_case(&self) -> &ProcessThreadUseCase<G, V> {
        &self.use_case
    }

    /// Create a thread and process it in the background.
    pub fn submit(&self, prompt: &str) -> Result<ThreadId, ProcessThreadError> {
        let thread = self.use_case.create_thread(prompt)?;
        let id = thread.id.clone();

        let use_case = self.use_case.clone();
        let task_id = id.clone();
        self.tasks.spawn(async move {
            if let Err(e) = use_case.run(&task_id).await {
                error!(thread_id = %task_id, error = %e, "Thread worker failed");
            }
        });
        Ok(id)
    }

    /// Create a thread and process it until it pauses or terminates.
    pub async fn run(&self, prompt: &str) -> Result<ThreadSnapshot, ProcessThreadError> {
        let thread = self.use_case.create_thread(prompt)?;
        self.use_case.run(&thread.id).await
    }

    pub fn get_thread(&self, id: &ThreadId) -> Result<ThreadSnapshot, ProcessThreadError> {
        self.use_case.snapshot(id)
    }

    /// Accept clarification answers and resume in the background.
    ///
    /// The request is checked and the thread claimed before this returns,
    /// so rejected requests leave the thread untouched.
    pub fn submit_answers(
        &self,
        id: &ThreadId,
        answers: Vec<String>,
        skipped: bool,
    ) -> Result<(), ProcessThreadError> {
        let thread = self.use_case.begin_resume(id, &answers, skipped)?;

        let use_case = self.use_case.clone();
        let task_id = id.clone();
        self.tasks.spawn(async move {
            if let Err(e) = use_case.continue_resume(thread, answers, skipped).await {
                error!(thread_id = %task_id, error = %e, "Resume worker failed");
            }
        });
        Ok(())
    }

    /// Accept clarification answers and resume until the next stop.
    pub async fn answer(
        &self,
        id: &ThreadId,
        answers: Vec<String>,
        skipped: bool,
    ) -> Result<ThreadSnapshot, ProcessThreadError> {
        self.use_case.resume(id, answers, skipped).await
    }

    /// Resume, as skipped, every thread awaiting input for longer than
    /// `older_than`. Returns the ids that were resumed.
    pub fn skip_stale(&self, older_than: Duration) -> Result<Vec<ThreadId>, ProcessThreadError> {
        let mut resumed = Vec::new();
        for id in self.use_case.stale_awaiting(older_than)? {
            match self.submit_answers(&id, Vec::new(), true) {
                Ok(()) => {
                    info!(thread_id = %id, "Clarification timed out, resuming as skipped");
                    resumed.push(id);
                }
                // Answered or resumed concurrently
                Err(e) => debug!(thread_id = %id, error = %e, "Skipping stale thread"),
            }
        }
        Ok(resumed)
    }

    /// Wait for every background worker to finish.
    pub async fn shutdown(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }
}
