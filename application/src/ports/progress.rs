//! Progress notification port
//!
//! Defines the interface for reporting progress while a thread is processed.

use rewriter_domain::{ProcessingState, ThreadId, ThreadStatus, ValidationKind};

/// Callback for progress updates during thread processing
///
/// Implementations live in the presentation layer. All methods default to
/// no-ops so implementations pick only what they display.
pub trait ThreadProgressNotifier: Send + Sync {
    /// Called on every state-machine transition
    fn on_state_change(&self, _thread_id: &ThreadId, _state: ProcessingState) {}

    /// Called after each validation pass
    fn on_validated(&self, _thread_id: &ThreadId, _output: ValidationKind, _findings: usize) {}

    /// Called before a rewrite attempt is sent for generation
    fn on_rewrite(&self, _thread_id: &ThreadId, _attempt: usize, _max: usize, _kind: ValidationKind) {
    }

    /// Called when the worker suspends for clarification
    fn on_paused(&self, _thread_id: &ThreadId, _questions: &[String]) {}

    /// Called when the thread reaches `completed` or `error`
    fn on_terminal(&self, _thread_id: &ThreadId, _status: ThreadStatus) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoThreadProgress;

impl ThreadProgressNotifier for NoThreadProgress {}
