//! Logging infrastructure — structured audit logging.
//!
//! Provides [`JsonlAuditSink`], an append-only JSONL writer that implements
//! the [`AuditSink`](rewriter_application::AuditSink) port.

mod jsonl_audit;

pub use jsonl_audit::JsonlAuditSink;
