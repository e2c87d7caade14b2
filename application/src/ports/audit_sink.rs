//! Port for auditing terminal thread outcomes.
//!
//! Records are written when a thread is accepted or when its iteration
//! budget runs out. This is separate from `tracing` diagnostics: the audit
//! trail is a machine-readable record of what was answered and why.

use rewriter_domain::{Finding, Thread};

/// Port for recording terminal outcomes.
///
/// Methods are synchronous and non-fallible: implementations log their own
/// failures and never surface them to the orchestrator.
pub trait AuditSink: Send + Sync {
    /// A response was accepted. `findings` are those of the final validation.
    fn record_accepted(&self, thread: &Thread, findings: &[Finding]);

    /// The iteration budget ran out before a valid response was reached.
    fn record_budget_exhausted(
        &self,
        thread: &Thread,
        iteration_summaries: &[String],
        last_finding: Option<&Finding>,
    );
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditSink;

impl AuditSink for NoAuditSink {
    fn record_accepted(&self, _thread: &Thread, _findings: &[Finding]) {}

    fn record_budget_exhausted(
        &self,
        _thread: &Thread,
        _iteration_summaries: &[String],
        _last_finding: Option<&Finding>,
    ) {
    }
}
