//! Infrastructure layer for policy-rewriter
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: thread storage, audit logging, policy and
//! template loading, configuration files and (behind the `bedrock`
//! feature) the Bedrock generation and guardrail validation clients.

pub mod config;
pub mod logging;
pub mod persistence;
pub mod policy;
pub mod prompts;
#[cfg(feature = "bedrock")]
pub mod providers;
pub mod retry;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, FileAuditConfig, FileBedrockConfig, FileConfig, FileGuardrailConfig,
    FileModelConfig, FileOutputConfig, FileOutputFormat, FilePolicyConfig, FileRewriteConfig,
    FileStorageConfig, FileTemplatesConfig, Severity, StorageBackend,
};
pub use logging::JsonlAuditSink;
pub use persistence::{InMemoryThreadRepository, JsonFileThreadRepository};
pub use policy::{PolicyLoadError, load_policy_definition};
pub use prompts::{TemplateLoadError, load_template_overrides};
#[cfg(feature = "bedrock")]
pub use providers::bedrock::{BedrockGenerationGateway, BedrockGuardrailValidator};
pub use retry::RetryPolicy;
