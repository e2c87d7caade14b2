//! Process-local thread store.

use chrono::{DateTime, Utc};
use rewriter_application::{RepositoryError, ThreadRepository};
use rewriter_domain::{Thread, ThreadId, ThreadStatus};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Threads kept in a `Mutex<HashMap>`; lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryThreadRepository {
    threads: Mutex<HashMap<ThreadId, Thread>>,
}

impl InMemoryThreadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|threads| threads.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ThreadId, Thread>>, RepositoryError> {
        self.threads
            .lock()
            .map_err(|_| RepositoryError::Storage("thread store lock poisoned".to_string()))
    }
}

impl ThreadRepository for InMemoryThreadRepository {
    fn insert(&self, thread: &Thread) -> Result<(), RepositoryError> {
        let mut threads = self.lock()?;
        if threads.contains_key(&thread.id) {
            return Err(RepositoryError::AlreadyExists {
                id: thread.id.clone(),
            });
        }
        threads.insert(thread.id.clone(), thread.clone());
        Ok(())
    }

    fn get(&self, id: &ThreadId) -> Result<Option<Thread>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn save(&self, thread: &Thread) -> Result<(), RepositoryError> {
        let mut threads = self.lock()?;
        match threads.get_mut(&thread.id) {
            Some(stored) => {
                *stored = thread.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(thread.id.clone())),
        }
    }

    fn transition(
        &self,
        id: &ThreadId,
        expected: ThreadStatus,
        next: ThreadStatus,
    ) -> Result<Thread, RepositoryError> {
        let mut threads = self.lock()?;
        let thread = threads
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        if thread.status != expected {
            return Err(RepositoryError::StatusConflict {
                id: id.clone(),
                expected,
                actual: thread.status,
            });
        }
        thread.set_status(next);
        Ok(thread.clone())
    }

    fn stale_awaiting(&self, cutoff: DateTime<Utc>) -> Result<Vec<ThreadId>, RepositoryError> {
        let mut ids: Vec<ThreadId> = self
            .lock()?
            .values()
            .filter(|t| is_stale(t, cutoff))
            .map(|t| t.id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

pub(super) fn is_stale(thread: &Thread, cutoff: DateTime<Utc>) -> bool {
    thread.status == ThreadStatus::AwaitingUserInput
        && thread
            .awaiting_input_since
            .is_some_and(|since| since <= cutoff)
}
