//! One JSON document per thread under a directory.
//!
//! Writes go to `<id>.json.tmp` and are renamed over `<id>.json`, so a
//! reader never sees a half-written record. Compare-and-set transitions
//! are serialized with a process-local lock.

use super::memory::is_stale;
use chrono::{DateTime, Utc};
use rewriter_application::{RepositoryError, ThreadRepository};
use rewriter_domain::{Thread, ThreadId, ThreadStatus};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct JsonFileThreadRepository {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileThreadRepository {
    /// Open (and create if needed) the thread directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            RepositoryError::Storage(format!("cannot create {}: {}", dir.display(), e))
        })?;
        debug!("Thread store at {}", dir.display());
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, RepositoryError> {
        self.lock
            .lock()
            .map_err(|_| RepositoryError::Storage("thread store lock poisoned".to_string()))
    }

    /// Ids become file names, so anything that could escape the directory
    /// is treated as unknown.
    fn path_for(&self, id: &ThreadId) -> Option<PathBuf> {
        let id = id.as_str();
        let safe = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.dir.join(format!("{}.json", id)))
    }

    fn read(&self, path: &Path) -> Result<Option<Thread>, RepositoryError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RepositoryError::Storage(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        serde_json::from_str(&content).map(Some).map_err(|e| {
            RepositoryError::Storage(format!("corrupt thread file {}: {}", path.display(), e))
        })
    }

    fn write(&self, path: &Path, thread: &Thread) -> Result<(), RepositoryError> {
        let json = serde_json::to_string_pretty(thread)
            .map_err(|e| RepositoryError::Storage(format!("cannot serialize thread: {}", e)))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, path))
            .map_err(|e| {
                RepositoryError::Storage(format!("cannot write {}: {}", path.display(), e))
            })
    }

    fn existing_path(&self, id: &ThreadId) -> Result<PathBuf, RepositoryError> {
        match self.path_for(id) {
            Some(path) if path.exists() => Ok(path),
            _ => Err(RepositoryError::NotFound(id.clone())),
        }
    }
}

impl ThreadRepository for JsonFileThreadRepository {
    fn insert(&self, thread: &Thread) -> Result<(), RepositoryError> {
        let _guard = self.guard()?;
        let path = self.path_for(&thread.id).ok_or_else(|| {
            RepositoryError::Storage(format!("invalid thread id: {}", thread.id))
        })?;
        if path.exists() {
            return Err(RepositoryError::AlreadyExists {
                id: thread.id.clone(),
            });
        }
        self.write(&path, thread)
    }

    fn get(&self, id: &ThreadId) -> Result<Option<Thread>, RepositoryError> {
        match self.path_for(id) {
            Some(path) => self.read(&path),
            None => Ok(None),
        }
    }

    fn save(&self, thread: &Thread) -> Result<(), RepositoryError> {
        let _guard = self.guard()?;
        let path = self.existing_path(&thread.id)?;
        self.write(&path, thread)
    }

    fn transition(
        &self,
        id: &ThreadId,
        expected: ThreadStatus,
        next: ThreadStatus,
    ) -> Result<Thread, RepositoryError> {
        let _guard = self.guard()?;
        let path = self.existing_path(id)?;
        let mut thread = self
            .read(&path)?
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        if thread.status != expected {
            return Err(RepositoryError::StatusConflict {
                id: id.clone(),
                expected,
                actual: thread.status,
            });
        }
        thread.set_status(next);
        self.write(&path, &thread)?;
        Ok(thread)
    }

    fn stale_awaiting(&self, cutoff: DateTime<Utc>) -> Result<Vec<ThreadId>, RepositoryError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            RepositoryError::Storage(format!("cannot list {}: {}", self.dir.display(), e))
        })?;

        let mut ids = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read(&path) {
                Ok(Some(thread)) if is_stale(&thread, cutoff) => ids.push(thread.id),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable thread file: {}", e),
            }
        }
        ids.sort();
        Ok(ids)
    }
}
