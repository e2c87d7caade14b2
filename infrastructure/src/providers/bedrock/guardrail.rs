//! Answer validation through Bedrock ApplyGuardrail.
//!
//! The prompt is sent as the `query` and the answer as the
//! `guard_content`, with `source = OUTPUT` and only interventions in the
//! output scope. The overall kind is derived locally from the findings.

use super::convert::findings_from_assessments;
use super::errors;
use crate::config::FileGuardrailConfig;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::types as bedrock;
use rewriter_application::{ValidationError, ValidationGateway};
use rewriter_domain::ValidationReport;
use std::sync::Arc;
use tracing::debug;

pub struct BedrockGuardrailValidator {
    client: Arc<BedrockClient>,
    guardrail_id: String,
    guardrail_version: String,
    retry: RetryPolicy,
}

impl BedrockGuardrailValidator {
    /// Fails when no guardrail id is configured.
    pub fn new(
        client: Arc<BedrockClient>,
        config: &FileGuardrailConfig,
    ) -> Result<Self, ValidationError> {
        let guardrail_id = config
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ValidationError::RequestFailed("no guardrail id configured".to_string())
            })?;
        Ok(Self {
            client,
            guardrail_id: guardrail_id.to_string(),
            guardrail_version: config.version.clone(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn apply_once(&self, prompt: &str, answer: &str) -> Result<ValidationReport, ValidationError> {
        let query = text_block(prompt, bedrock::GuardrailContentQualifier::Query)?;
        let guarded = text_block(answer, bedrock::GuardrailContentQualifier::GuardContent)?;

        debug!(
            guardrail = %self.guardrail_id,
            version = %self.guardrail_version,
            "Calling Bedrock ApplyGuardrail"
        );

        let response = self
            .client
            .apply_guardrail()
            .guardrail_identifier(&self.guardrail_id)
            .guardrail_version(&self.guardrail_version)
            .source(bedrock::GuardrailContentSource::Output)
            .output_scope(bedrock::GuardrailOutputScope::Interventions)
            .content(query)
            .content(guarded)
            .send()
            .await
            .map_err(|e| errors::validation_error(&e))?;

        let findings = findings_from_assessments(response.assessments());
        debug!(findings = findings.len(), action = ?response.action(), "Guardrail assessed answer");
        Ok(ValidationReport::from_findings(findings))
    }
}

fn text_block(
    text: &str,
    qualifier: bedrock::GuardrailContentQualifier,
) -> Result<bedrock::GuardrailContentBlock, ValidationError> {
    bedrock::GuardrailTextBlock::builder()
        .text(text)
        .qualifiers(qualifier)
        .build()
        .map(bedrock::GuardrailContentBlock::Text)
        .map_err(|e| ValidationError::RequestFailed(format!("Failed to build content block: {}", e)))
}

#[async_trait]
impl ValidationGateway for BedrockGuardrailValidator {
    async fn validate(
        &self,
        prompt: &str,
        answer: &str,
    ) -> Result<ValidationReport, ValidationError> {
        self.retry
            .run("validate response", ValidationError::is_transient, || {
                self.apply_once(prompt, answer)
            })
            .await
    }
}
