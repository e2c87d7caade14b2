//! Shared utilities for use cases.

use rewriter_domain::ThreadId;
use std::time::Instant;
use tracing::debug;

/// Logs the elapsed time of a collaborator call when dropped.
pub(crate) struct ScopedTimer<'a> {
    thread_id: &'a ThreadId,
    operation: &'static str,
    started: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub(crate) fn start(thread_id: &'a ThreadId, operation: &'static str) -> Self {
        Self {
            thread_id,
            operation,
            started: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        debug!(
            thread_id = %self.thread_id,
            operation = self.operation,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Operation finished"
        );
    }
}
