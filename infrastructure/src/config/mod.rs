//! Configuration file loading for policy-rewriter
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `REWRITER_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./rewriter.toml` or `./.rewriter.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/policy-rewriter/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileAuditConfig, FileBedrockConfig, FileConfig, FileGuardrailConfig,
    FileModelConfig, FileOutputConfig, FileOutputFormat, FilePolicyConfig, FileRewriteConfig,
    FileStorageConfig, FileTemplatesConfig, Severity, StorageBackend,
};
pub use loader::ConfigLoader;
