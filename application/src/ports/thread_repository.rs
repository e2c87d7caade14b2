//! Thread repository port
//!
//! Thread records are keyed by id. [`ThreadRepository::transition`] is the
//! mutual-exclusion gate: a worker may only start on a thread after it has
//! atomically moved the persisted status from the expected value.

use chrono::{DateTime, Utc};
use rewriter_domain::{Thread, ThreadId, ThreadStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Thread not found: {0}")]
    NotFound(ThreadId),

    #[error("Thread {id} already exists")]
    AlreadyExists { id: ThreadId },

    #[error("Thread {id} is {actual}, expected {expected}")]
    StatusConflict {
        id: ThreadId,
        expected: ThreadStatus,
        actual: ThreadStatus,
    },

    #[error("Thread storage error: {0}")]
    Storage(String),
}

pub trait ThreadRepository: Send + Sync {
    /// Store a new thread. Fails if the id is taken.
    fn insert(&self, thread: &Thread) -> Result<(), RepositoryError>;

    fn get(&self, id: &ThreadId) -> Result<Option<Thread>, RepositoryError>;

    /// Overwrite an existing thread record.
    fn save(&self, thread: &Thread) -> Result<(), RepositoryError>;

    /// Atomically move `id` from `expected` to `next` and return the updated
    /// record. Fails with [`RepositoryError::StatusConflict`] (without
    /// changing anything) if the stored status is not `expected`.
    fn transition(
        &self,
        id: &ThreadId,
        expected: ThreadStatus,
        next: ThreadStatus,
    ) -> Result<Thread, RepositoryError>;

    /// Threads that have been awaiting input since before `cutoff`.
    fn stale_awaiting(&self, cutoff: DateTime<Utc>) -> Result<Vec<ThreadId>, RepositoryError>;
}
