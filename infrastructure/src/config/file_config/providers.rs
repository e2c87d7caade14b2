//! Model and AWS configuration from TOML (`[model]`, `[bedrock]`, `[guardrail]`)

use serde::{Deserialize, Serialize};

/// Generation model (`[model]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Bedrock model id used for every generation call
    pub id: String,
    /// Invoke through the regional inference profile (`us.`, `eu.`, ...)
    /// instead of the bare model id
    pub requires_inference_profile: bool,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            id: "anthropic.claude-3-5-haiku-20241022-v1:0".to_string(),
            requires_inference_profile: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBedrockConfig {
    /// AWS region for Bedrock calls (default: "us-east-1")
    pub region: String,
    /// AWS profile name for credentials
    pub profile: Option<String>,
    /// Max Tokens per response (default: 2048)
    pub max_tokens: u32,
    /// Sampling temperature; the model default when unset
    pub temperature: Option<f32>,
}

impl Default for FileBedrockConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            profile: None,
            max_tokens: 2048,
            temperature: None,
        }
    }
}

/// Guardrail holding the Automated Reasoning policy (`[guardrail]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGuardrailConfig {
    /// Guardrail identifier or ARN
    pub id: Option<String>,
    /// Guardrail version (default: "DRAFT")
    pub version: String,
}

impl Default for FileGuardrailConfig {
    fn default() -> Self {
        Self {
            id: None,
            version: "DRAFT".to_string(),
        }
    }
}
