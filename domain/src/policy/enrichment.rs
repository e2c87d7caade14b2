//! Resolve bare rule identifiers inside findings to full rule content.

use super::definition::RuleLookup;
use crate::finding::Finding;

/// Attach rule content to every supporting/contradicting rule reference.
///
/// Identifiers that the lookup does not know are passed through unchanged.
/// Findings without rule references are returned as-is.
pub fn enrich_findings(findings: Vec<Finding>, lookup: &dyn RuleLookup) -> Vec<Finding> {
    findings
        .into_iter()
        .map(|finding| enrich_finding(finding, lookup))
        .collect()
}

fn enrich_finding(mut finding: Finding, lookup: &dyn RuleLookup) -> Finding {
    if let Some(rules) = finding.rules_mut() {
        for rule in rules.iter_mut() {
            if let Some(content) = lookup.rule_content(&rule.identifier) {
                rule.content = Some(content);
            }
        }
    }
    finding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{
        AmbiguityDetails, ContradictionDetails, RuleReference, ValidDetails,
    };
    use crate::policy::definition::{PolicyDefinition, PolicyRule, RuleIndex};

    fn index() -> RuleIndex {
        RuleIndex::from_definition(&PolicyDefinition {
            version: "1".to_string(),
            rules: vec![PolicyRule {
                id: "R1".to_string(),
                expression: "(=> a b)".to_string(),
                alternate_expression: "if a then b".to_string(),
                description: "a implies b".to_string(),
            }],
            variables: vec![],
        })
    }

    #[test]
    fn test_enrich_contradicting_rules() {
        let findings = vec![Finding::Invalid(ContradictionDetails {
            contradicting_rules: vec![RuleReference::new("R1"), RuleReference::new("R404")],
            ..Default::default()
        })];

        let enriched = enrich_findings(findings, &index());
        let rules = enriched[0].rules();
        assert_eq!(rules[0].identifier, "R1");
        assert_eq!(rules[0].display_text(), "if a then b");
        assert_eq!(rules[0].content.as_ref().unwrap().description, "a implies b");

        // Unknown identifiers pass through untouched
        assert_eq!(rules[1], RuleReference::new("R404"));
    }

    #[test]
    fn test_enrich_supporting_rules() {
        let findings = vec![Finding::Valid(ValidDetails {
            supporting_rules: vec![RuleReference::new("R1")],
            ..Default::default()
        })];
        let enriched = enrich_findings(findings, &index());
        assert!(enriched[0].rules()[0].content.is_some());
    }

    #[test]
    fn test_findings_without_rules_unchanged() {
        let original = vec![Finding::TranslationAmbiguous(AmbiguityDetails::default())];
        let enriched = enrich_findings(original.clone(), &index());
        assert_eq!(enriched, original);
    }

    #[test]
    fn test_empty_index_passes_through() {
        let original = vec![Finding::Impossible(ContradictionDetails {
            contradicting_rules: vec![RuleReference::new("R1")],
            ..Default::default()
        })];
        let enriched = enrich_findings(original.clone(), &RuleIndex::new());
        assert_eq!(enriched, original);
    }
}
