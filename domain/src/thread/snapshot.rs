//! Read-only projection of a thread for callers.

use super::entities::{Iteration, Thread, ThreadStatus};
use super::value_objects::ThreadId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    pub thread_id: ThreadId,
    pub status: ThreadStatus,
    pub user_prompt: String,
    pub model_id: String,
    pub iterations: Vec<Iteration>,
    pub iteration_counter: usize,
    pub max_iterations: usize,
    pub final_response: Option<String>,
    pub warning_message: Option<String>,
    /// Set while the thread is waiting for clarification answers.
    pub pending_questions: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Thread> for ThreadSnapshot {
    fn from(thread: &Thread) -> Self {
        Self {
            thread_id: thread.id.clone(),
            status: thread.status,
            user_prompt: thread.user_prompt.clone(),
            model_id: thread.model_id.clone(),
            iterations: thread.iterations.clone(),
            iteration_counter: thread.iteration_counter,
            max_iterations: thread.max_iterations,
            final_response: thread.final_response.clone(),
            warning_message: thread.warning_message.clone(),
            pending_questions: thread.pending_questions().map(<[String]>::to_vec),
            created_at: thread.created_at,
            completed_at: thread.completed_at,
        }
    }
}

impl ThreadSnapshot {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_of_new_thread() {
        let thread = Thread::new("prompt", "model", 3).unwrap();
        let snapshot = ThreadSnapshot::from(&thread);
        assert_eq!(snapshot.thread_id, thread.id);
        assert_eq!(snapshot.status, ThreadStatus::Processing);
        assert!(snapshot.pending_questions.is_none());
        assert!(!snapshot.is_terminal());
        assert_eq!(snapshot.max_iterations, 3);
    }
}
