//! Prompt templates for the validate-and-rewrite loop.
//!
//! Templates are plain text with `{{placeholder}}` markers. Built-in texts
//! live on [`PromptTemplate`]; a [`TemplateSet`] starts from them and can
//! take per-name overrides (loaded from `<name>.md` files by the
//! infrastructure layer).

use crate::finding::ValidationKind;
use std::collections::HashMap;
use std::fmt;

/// Identifies one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateName {
    InitialResponse,
    /// Rewrite prompt for one actionable finding kind.
    Rewrite(ValidationKind),
    ClarificationRegeneration,
    ClarificationSkipped,
    FallbackNoFindings,
    FallbackNoTemplate,
}

impl TemplateName {
    /// All names that have a built-in template.
    pub fn all() -> Vec<TemplateName> {
        let mut names = vec![
            TemplateName::InitialResponse,
            TemplateName::ClarificationRegeneration,
            TemplateName::ClarificationSkipped,
            TemplateName::FallbackNoFindings,
            TemplateName::FallbackNoTemplate,
        ];
        names.extend(
            ValidationKind::ALL
                .into_iter()
                .filter(|kind| PromptTemplate::rewrite(*kind).is_some())
                .map(TemplateName::Rewrite),
        );
        names
    }

    /// File stem used for overrides, e.g. `initial_response`, `invalid`.
    pub fn file_stem(&self) -> String {
        match self {
            TemplateName::InitialResponse => "initial_response".to_string(),
            TemplateName::Rewrite(kind) => kind.as_str().to_ascii_lowercase(),
            TemplateName::ClarificationRegeneration => "clarification_regeneration".to_string(),
            TemplateName::ClarificationSkipped => "clarification_skipped".to_string(),
            TemplateName::FallbackNoFindings => "fallback_no_findings".to_string(),
            TemplateName::FallbackNoTemplate => "fallback_no_template".to_string(),
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

const DECISION_FORMAT: &str = r#"Respond in exactly one of these formats.

To rewrite the answer:
DECISION: REWRITE
ANSWER: <the complete corrected answer>

If information only the user can provide is missing:
DECISION: ASK_QUESTIONS
QUESTION: <question 1>
QUESTION: <question 2>
(at most 5 questions)

If no answer can be consistent with the policy:
DECISION: IMPOSSIBLE
<a short explanation for the user>"#;

/// Built-in template texts.
pub struct PromptTemplate;

impl PromptTemplate {
    pub fn initial_response() -> &'static str {
        r#"You are an assistant whose answers are checked against a formal policy.
Answer the user's question accurately and only make claims the policy supports.
If you cannot answer without knowing more about the user's situation, ask for it
on separate lines starting with "QUESTION:".

User question:
{{user_prompt}}

{{policy_context}}"#
    }

    /// Rewrite template for a finding kind. `None` for kinds that never
    /// drive a rewrite.
    pub fn rewrite(kind: ValidationKind) -> Option<String> {
        let guidance = match kind {
            ValidationKind::TranslationAmbiguous => {
                "The validator could not decide how to interpret your answer: several readings \
                 are possible. Rewrite the answer so it has a single clear meaning. If the \
                 ambiguity comes from the user's question itself, ask the user instead."
            }
            ValidationKind::Impossible => {
                "The validator found that the premises of this exchange cannot all be true at \
                 once. Rewrite the answer without the contradictory assumptions, or explain why \
                 the question cannot be answered."
            }
            ValidationKind::Invalid => {
                "The validator proved that your answer contradicts the policy rules below. \
                 Rewrite the answer so that every claim agrees with those rules."
            }
            ValidationKind::Satisfiable => {
                "Your answer is only correct under some assumptions the user has not stated. \
                 The scenarios below show which facts decide the outcome. Rewrite the answer to \
                 state those conditions explicitly, or ask the user about them."
            }
            ValidationKind::NoTranslations | ValidationKind::Valid | ValidationKind::TooComplex => {
                return None;
            }
        };

        Some(format!(
            r#"{guidance}

Original question:
{{{{original_prompt}}}}

Your previous answer:
{{{{original_response}}}}

Validation findings:
{{{{findings}}}}

{{{{context_augmentation}}}}

{{{{policy_context}}}}

{DECISION_FORMAT}"#
        ))
    }

    pub fn clarification_regeneration() -> &'static str {
        r#"The user answered your clarifying questions. Write a new, complete answer to the
original question that takes their answers into account. Do not ask further questions.

Original question:
{{user_prompt}}

Your previous answer:
{{original_response}}

{{context_augmentation}}"#
    }

    pub fn clarification_skipped() -> &'static str {
        r#"The user chose not to answer your clarifying questions. Write a new, complete answer
to the original question. Where the answer depends on facts you do not know, state the
conditions explicitly instead of assuming them. Do not ask further questions.

Original question:
{{user_prompt}}

Your previous answer:
{{original_response}}"#
    }

    pub fn fallback_no_findings() -> &'static str {
        r#"Your previous answer could not be validated. Review it for accuracy and rewrite it.

Original question:
{{original_prompt}}

Your previous answer:
{{original_response}}"#
    }

    pub fn fallback_no_template() -> &'static str {
        r#"The validator reported problems with your previous answer. Rewrite it to address them.

Original question:
{{original_prompt}}

Your previous answer:
{{original_response}}

Validation findings:
{{findings}}"#
    }

    pub fn builtin(name: TemplateName) -> Option<String> {
        match name {
            TemplateName::InitialResponse => Some(Self::initial_response().to_string()),
            TemplateName::Rewrite(kind) => Self::rewrite(kind),
            TemplateName::ClarificationRegeneration => {
                Some(Self::clarification_regeneration().to_string())
            }
            TemplateName::ClarificationSkipped => Some(Self::clarification_skipped().to_string()),
            TemplateName::FallbackNoFindings => Some(Self::fallback_no_findings().to_string()),
            TemplateName::FallbackNoTemplate => Some(Self::fallback_no_template().to_string()),
        }
    }
}

/// Built-in templates plus any overrides.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    overrides: HashMap<TemplateName, String>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, name: TemplateName, text: impl Into<String>) -> Self {
        self.overrides.insert(name, text.into());
        self
    }

    pub fn set_override(&mut self, name: TemplateName, text: impl Into<String>) {
        self.overrides.insert(name, text.into());
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// The override for `name`, else the built-in text.
    pub fn get(&self, name: TemplateName) -> Option<String> {
        self.overrides
            .get(&name)
            .cloned()
            .or_else(|| PromptTemplate::builtin(name))
    }
}

/// Replace `{{key}}` placeholders with their values.
///
/// A non-empty `policy_context` that the template does not reference is
/// appended at the end. Unknown placeholders are left as-is.
pub fn render(template: &str, values: &[(&str, &str)], policy_context: &str) -> String {
    let mut rendered = template.replace("{{policy_context}}", policy_context);
    for (key, value) in values {
        rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
    }
    if !policy_context.trim().is_empty() && !template.contains("{{policy_context}}") {
        rendered = format!("{}\n\n{}", rendered, policy_context);
    }
    rendered
}
