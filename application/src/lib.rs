//! Application layer for policy-rewriter
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::RewriteParams;
pub use ports::{
    audit_sink::{AuditSink, NoAuditSink},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoThreadProgress, ThreadProgressNotifier},
    thread_repository::{RepositoryError, ThreadRepository},
    validation_gateway::{ValidationError, ValidationGateway},
};
pub use use_cases::process_thread::{
    NOT_COVERED_WARNING, ProcessThreadError, ProcessThreadUseCase, TOO_COMPLEX_MESSAGE,
    budget_warning,
};
pub use use_cases::rewrite_service::RewriteService;
pub use use_cases::timeout_sweeper::AwaitingInputSweeper;
