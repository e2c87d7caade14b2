//! Text generation through the Bedrock Converse API.
//!
//! Every prompt is a single-turn conversation; the orchestrator keeps all
//! state on the thread, so no history is carried between calls.

use super::errors;
use super::model_map::invocation_model_id;
use crate::config::{FileBedrockConfig, FileModelConfig};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::types as bedrock;
use rewriter_application::{GatewayError, LlmGateway};
use std::sync::Arc;
use tracing::debug;

pub struct BedrockGenerationGateway {
    client: Arc<BedrockClient>,
    /// Model id as configured; recorded on threads.
    model_id: String,
    /// Id sent to Bedrock (inference profile when required).
    invocation_id: String,
    max_tokens: i32,
    temperature: Option<f32>,
    retry: RetryPolicy,
}

impl BedrockGenerationGateway {
    pub fn new(client: Arc<BedrockClient>, model: &FileModelConfig, bedrock: &FileBedrockConfig) -> Self {
        let invocation_id =
            invocation_model_id(&model.id, model.requires_inference_profile, &bedrock.region);
        if invocation_id != model.id {
            debug!(model = %model.id, profile = %invocation_id, "Using inference profile");
        }
        Self {
            client,
            model_id: model.id.clone(),
            invocation_id,
            max_tokens: i32::try_from(bedrock.max_tokens).unwrap_or(i32::MAX),
            temperature: bedrock.temperature,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn converse_once(&self, prompt: &str) -> Result<String, GatewayError> {
        let message = bedrock::Message::builder()
            .role(bedrock::ConversationRole::User)
            .content(bedrock::ContentBlock::Text(prompt.to_string()))
            .build()
            .map_err(|e| GatewayError::RequestFailed(format!("Failed to build message: {}", e)))?;

        let mut inference = bedrock::InferenceConfiguration::builder().max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            inference = inference.temperature(temperature);
        }

        debug!(
            model = %self.invocation_id,
            prompt_chars = prompt.len(),
            "Calling Bedrock Converse API"
        );

        let response = self
            .client
            .converse()
            .model_id(&self.invocation_id)
            .messages(message)
            .inference_config(inference.build())
            .send()
            .await
            .map_err(|e| errors::gateway_error(&e))?;

        let output = response.output().ok_or_else(|| {
            GatewayError::RequestFailed("No output in Bedrock response".to_string())
        })?;
        let text = output_text(output);
        if text.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Concatenated text blocks of the assistant message.
fn output_text(output: &bedrock::ConverseOutput) -> String {
    match output {
        bedrock::ConverseOutput::Message(message) => message
            .content()
            .iter()
            .filter_map(|block| match block {
                bedrock::ContentBlock::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect(),
        _ => String::new(),
    }
}

#[async_trait]
impl LlmGateway for BedrockGenerationGateway {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        self.retry
            .run("generate response", GatewayError::is_transient, || {
                self.converse_once(prompt)
            })
            .await
    }
}
