//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; conversion to application types
//! happens through helpers such as [`FileRewriteConfig::to_params`].

mod issues;
mod output;
mod paths;
mod providers;
mod rewrite;

pub use issues::{ConfigIssue, Severity};
pub use output::{FileOutputConfig, FileOutputFormat};
pub use paths::{
    FileAuditConfig, FilePolicyConfig, FileStorageConfig, FileTemplatesConfig, StorageBackend,
};
pub use providers::{FileBedrockConfig, FileGuardrailConfig, FileModelConfig};
pub use rewrite::FileRewriteConfig;

use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Generation model
    pub model: FileModelConfig,
    /// Rewrite loop budget and clarification timeout
    pub rewrite: FileRewriteConfig,
    /// AWS Bedrock client settings
    pub bedrock: FileBedrockConfig,
    /// Guardrail that runs the Automated Reasoning checks
    pub guardrail: FileGuardrailConfig,
    /// Policy definition for rule enrichment
    pub policy: FilePolicyConfig,
    /// Prompt template overrides
    pub templates: FileTemplatesConfig,
    /// Audit log
    pub audit: FileAuditConfig,
    /// Thread storage
    pub storage: FileStorageConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Errors mean a rewrite cannot run at all; warnings describe settings
    /// that work but probably not as intended.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.model.id.trim().is_empty() {
            issues.push(ConfigIssue::error("model.id", "model id is empty"));
        }

        if self.guardrail.id.as_deref().is_none_or(|id| id.trim().is_empty()) {
            issues.push(ConfigIssue::error(
                "guardrail.id",
                "no guardrail configured; validation needs a guardrail with an Automated Reasoning policy",
            ));
        }
        if self.guardrail.version.trim().is_empty() {
            issues.push(ConfigIssue::error("guardrail.version", "guardrail version is empty"));
        }

        if self.bedrock.max_tokens == 0 {
            issues.push(ConfigIssue::error("bedrock.max_tokens", "must be greater than 0"));
        }
        if let Some(temperature) = self.bedrock.temperature
            && !(0.0..=1.0).contains(&temperature)
        {
            issues.push(ConfigIssue::warning(
                "bedrock.temperature",
                format!("{} is outside 0.0..=1.0", temperature),
            ));
        }

        if self.rewrite.max_iterations == 0 {
            issues.push(ConfigIssue::warning(
                "rewrite.max_iterations",
                "0 disables rewriting; every non-valid answer ends with the budget warning",
            ));
        }
        if self.rewrite.awaiting_input_timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                "rewrite.awaiting_input_timeout_secs",
                "0 skips clarification questions on the next sweep",
            ));
        }

        issues
    }
}
