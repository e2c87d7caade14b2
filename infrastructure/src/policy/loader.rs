//! Read an exported policy definition from disk.
//!
//! Accepts either the bare definition (`{"version", "rules", "variables"}`)
//! or the build-workflow asset wrapper that nests it under
//! `policyDefinition`.

use rewriter_domain::PolicyDefinition;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PolicyLoadError {
    #[error("Cannot read policy definition {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid policy definition {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionFile {
    Wrapped {
        #[serde(rename = "policyDefinition")]
        policy_definition: PolicyDefinition,
    },
    Bare(PolicyDefinition),
}

pub fn load_policy_definition(path: &Path) -> Result<PolicyDefinition, PolicyLoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| PolicyLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: DefinitionFile =
        serde_json::from_str(&content).map_err(|source| PolicyLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let definition = match file {
        DefinitionFile::Wrapped { policy_definition } => policy_definition,
        DefinitionFile::Bare(definition) => definition,
    };
    info!(
        rules = definition.rules.len(),
        variables = definition.variables.len(),
        "Loaded policy definition from {}",
        path.display()
    );
    Ok(definition)
}
