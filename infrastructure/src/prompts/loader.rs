//! Load `<template_name>.md` overrides from a directory.
//!
//! Every template the renderer knows has a file stem (see
//! [`TemplateName::file_stem`]); a file with that stem replaces the
//! built-in text. Other files in the directory are ignored.

use rewriter_domain::{TemplateName, TemplateSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum TemplateLoadError {
    #[error("Template directory not found: {0}")]
    MissingDir(PathBuf),

    #[error("Cannot read template {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub fn load_template_overrides(dir: &Path) -> Result<TemplateSet, TemplateLoadError> {
    if !dir.is_dir() {
        return Err(TemplateLoadError::MissingDir(dir.to_path_buf()));
    }

    let mut templates = TemplateSet::new();
    for name in TemplateName::all() {
        let path = dir.join(format!("{}.md", name.file_stem()));
        if !path.is_file() {
            continue;
        }
        let text = std::fs::read_to_string(&path).map_err(|source| TemplateLoadError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(template = %name, "Template override from {}", path.display());
        templates.set_override(name, text);
    }

    info!(
        overrides = templates.override_count(),
        "Loaded prompt templates from {}",
        dir.display()
    );
    Ok(templates)
}
