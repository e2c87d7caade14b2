//! Per-kind payloads carried by a [`Finding`](super::Finding).

use serde::{Deserialize, Serialize};

/// One logical statement with its natural-language rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statement {
    pub logic: String,
    pub natural_language: String,
}

impl Statement {
    pub fn new(logic: impl Into<String>, natural_language: impl Into<String>) -> Self {
        Self {
            logic: logic.into(),
            natural_language: natural_language.into(),
        }
    }
}

/// An assignment of facts under which claims hold (or fail).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub statements: Vec<Statement>,
}

impl Scenario {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// How the validator translated the prompt and answer into logic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Translation {
    pub premises: Vec<Statement>,
    pub claims: Vec<Statement>,
    pub untranslated_premises: Vec<String>,
    pub untranslated_claims: Vec<String>,
    pub confidence: Option<f64>,
}

/// Human-readable rule text resolved from a policy definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleContent {
    pub expression: String,
    pub alternate_expression: String,
    pub description: String,
}

/// A rule cited by a finding. `content` is filled in by enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleReference {
    pub identifier: String,
    pub policy_version_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<RuleContent>,
}

impl RuleReference {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Default::default()
        }
    }

    /// The best available text for this rule: alternate expression,
    /// then expression, then the bare identifier.
    pub fn display_text(&self) -> &str {
        match &self.content {
            Some(c) if !c.alternate_expression.is_empty() => &c.alternate_expression,
            Some(c) if !c.expression.is_empty() => &c.expression,
            _ => &self.identifier,
        }
    }
}

/// Warning about premises or claims that are always true/false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicWarning {
    pub warning_type: Option<String>,
    pub premises: Vec<Statement>,
    pub claims: Vec<Statement>,
}

/// One candidate interpretation of an ambiguous input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationOption {
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidDetails {
    pub translation: Option<Translation>,
    pub supporting_rules: Vec<RuleReference>,
    pub claims_true_scenario: Option<Scenario>,
    pub logic_warning: Option<LogicWarning>,
}

/// Shared by `INVALID` and `IMPOSSIBLE`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContradictionDetails {
    pub translation: Option<Translation>,
    pub contradicting_rules: Vec<RuleReference>,
    pub logic_warning: Option<LogicWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatisfiableDetails {
    pub translation: Option<Translation>,
    pub claims_true_scenario: Option<Scenario>,
    pub claims_false_scenario: Option<Scenario>,
    pub logic_warning: Option<LogicWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbiguityDetails {
    pub options: Vec<TranslationOption>,
    pub difference_scenarios: Vec<Scenario>,
}

/// Used by `NO_TRANSLATIONS` and `TOO_COMPLEX`, which carry no rule data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationDetails {
    pub translation: Option<Translation>,
}
