//! Composes the outbound prompts of the rewrite loop.

use super::clarification::all_clarifications_context;
use super::findings::format_findings;
use super::template::{TemplateName, TemplateSet, render};
use crate::finding::Finding;
use crate::thread::QuestionAnswerExchange;

/// Renders initial, rewrite and clarification-resume prompts.
///
/// The policy context is rendered once up front and injected into the
/// initial and rewrite prompts.
#[derive(Debug, Clone, Default)]
pub struct PromptRenderer {
    templates: TemplateSet,
    policy_context: String,
}

impl PromptRenderer {
    pub fn new(templates: TemplateSet) -> Self {
        Self {
            templates,
            policy_context: String::new(),
        }
    }

    pub fn with_policy_context(mut self, policy_context: impl Into<String>) -> Self {
        self.policy_context = policy_context.into();
        self
    }

    pub fn policy_context(&self) -> &str {
        &self.policy_context
    }

    fn template(&self, name: TemplateName) -> String {
        self.templates.get(name).unwrap_or_default()
    }

    pub fn initial(&self, user_prompt: &str) -> String {
        render(
            &self.template(TemplateName::InitialResponse),
            &[("user_prompt", user_prompt)],
            &self.policy_context,
        )
    }

    /// Rewrite prompt for the given findings (normally exactly one).
    ///
    /// The template is chosen by the kind of the first finding. Every
    /// answered clarification so far is included as context.
    pub fn rewrite(
        &self,
        findings: &[Finding],
        original_prompt: &str,
        original_response: &str,
        clarifications: &[QuestionAnswerExchange],
    ) -> String {
        let Some(first) = findings.first() else {
            return render(
                &self.template(TemplateName::FallbackNoFindings),
                &[
                    ("original_prompt", original_prompt),
                    ("original_response", original_response),
                ],
                "",
            );
        };

        let formatted = format_findings(findings);
        let context = all_clarifications_context(clarifications);
        let values = [
            ("findings", formatted.as_str()),
            ("context_augmentation", context.as_str()),
            ("original_prompt", original_prompt),
            ("original_response", original_response),
        ];

        match self.templates.get(TemplateName::Rewrite(first.kind())) {
            Some(template) => render(&template, &values, &self.policy_context),
            None => render(
                &self.template(TemplateName::FallbackNoTemplate),
                &values,
                &self.policy_context,
            ),
        }
    }

    /// Resume prompt after the user answered clarifying questions.
    pub fn clarification(
        &self,
        user_prompt: &str,
        original_response: &str,
        context_augmentation: &str,
    ) -> String {
        render(
            &self.template(TemplateName::ClarificationRegeneration),
            &[
                ("context_augmentation", context_augmentation),
                ("user_prompt", user_prompt),
                ("original_response", original_response),
            ],
            "",
        )
    }

    /// Resume prompt after the user skipped the clarifying questions.
    pub fn clarification_skipped(&self, user_prompt: &str, original_response: &str) -> String {
        render(
            &self.template(TemplateName::ClarificationSkipped),
            &[
                ("user_prompt", user_prompt),
                ("original_response", original_response),
            ],
            "",
        )
    }
}
