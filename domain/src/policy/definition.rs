//! Automated Reasoning policy definition and rule lookup.

use crate::finding::RuleContent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One rule of a policy definition (`rules[]` in the exported JSON).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyRule {
    pub id: String,
    pub expression: String,
    pub alternate_expression: String,
    pub description: String,
}

/// One variable of a policy definition (`variables[]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: String,
    pub description: String,
}

/// A policy definition as exported from a completed policy build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyDefinition {
    pub version: String,
    pub rules: Vec<PolicyRule>,
    pub variables: Vec<PolicyVariable>,
}

impl PolicyDefinition {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.variables.is_empty()
    }
}

/// Resolves a rule identifier to its human-readable content.
pub trait RuleLookup: Send + Sync {
    fn rule_content(&self, identifier: &str) -> Option<RuleContent>;
}

/// In-memory rule index keyed by rule id.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    rules: HashMap<String, RuleContent>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a policy definition. Rules without an id are skipped.
    pub fn from_definition(definition: &PolicyDefinition) -> Self {
        let rules = definition
            .rules
            .iter()
            .filter(|rule| !rule.id.is_empty())
            .map(|rule| {
                (
                    rule.id.clone(),
                    RuleContent {
                        expression: rule.expression.clone(),
                        alternate_expression: rule.alternate_expression.clone(),
                        description: rule.description.clone(),
                    },
                )
            })
            .collect();
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleLookup for RuleIndex {
    fn rule_content(&self, identifier: &str) -> Option<RuleContent> {
        self.rules.get(identifier).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = r#"{
        "version": "1.0",
        "rules": [
            {
                "id": "rule-1",
                "expression": "(=> (employee x) (has_badge x))",
                "alternateExpression": "All employees must have a badge",
                "description": "Badge policy"
            },
            { "expression": "(orphan)" }
        ],
        "variables": [
            { "name": "is_employee", "type": "BOOL", "description": "Whether the person is an employee" }
        ]
    }"#;

    #[test]
    fn test_parse_exported_definition() {
        let def: PolicyDefinition = serde_json::from_str(DEFINITION).unwrap();
        assert_eq!(def.version, "1.0");
        assert_eq!(def.rules.len(), 2);
        assert_eq!(
            def.rules[0].alternate_expression,
            "All employees must have a badge"
        );
        assert_eq!(def.variables[0].var_type, "BOOL");
    }

    #[test]
    fn test_index_skips_rules_without_id() {
        let def: PolicyDefinition = serde_json::from_str(DEFINITION).unwrap();
        let index = RuleIndex::from_definition(&def);
        assert_eq!(index.len(), 1);

        let content = index.rule_content("rule-1").unwrap();
        assert_eq!(content.description, "Badge policy");
        assert!(index.rule_content("rule-9").is_none());
    }

    #[test]
    fn test_empty_definition() {
        let def = PolicyDefinition::default();
        assert!(def.is_empty());
        assert!(RuleIndex::from_definition(&def).is_empty());
    }
}
