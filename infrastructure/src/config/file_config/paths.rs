//! File locations from TOML (`[policy]`, `[templates]`, `[audit]`, `[storage]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Policy definition used to enrich rule references (`[policy]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePolicyConfig {
    /// Exported policy definition JSON; rule ids stay bare when unset
    pub definition_path: Option<PathBuf>,
}

/// Prompt template overrides (`[templates]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTemplatesConfig {
    /// Directory of `<template_name>.md` files
    pub dir: Option<PathBuf>,
}

/// Audit log (`[audit]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    pub enabled: bool,
    /// JSONL file; defaults to `<data dir>/policy-rewriter/audit.log`
    pub path: Option<PathBuf>,
}

impl Default for FileAuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl FileAuditConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| data_dir().join("audit.log"))
    }
}

/// Where threads are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per thread, so `answer` and `show` work across runs
    #[default]
    File,
    /// Process memory only; threads are lost on exit
    Memory,
}

/// Thread storage (`[storage]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    pub backend: StorageBackend,
    /// Defaults to `<data dir>/policy-rewriter/threads`
    pub threads_dir: Option<PathBuf>,
}

impl FileStorageConfig {
    pub fn resolved_threads_dir(&self) -> PathBuf {
        self.threads_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("threads"))
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("policy-rewriter")
}
