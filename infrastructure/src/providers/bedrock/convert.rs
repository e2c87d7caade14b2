//! Automated Reasoning findings → domain [`Finding`]s.

use aws_sdk_bedrockruntime::types as bedrock;
use rewriter_domain::{
    AmbiguityDetails, ContradictionDetails, Finding, LogicWarning, RuleReference,
    SatisfiableDetails, Scenario, Statement, Translation, TranslationDetails, TranslationOption,
    ValidDetails,
};
use tracing::warn;

/// All Automated Reasoning findings across the guardrail's assessments.
pub(super) fn findings_from_assessments(assessments: &[bedrock::GuardrailAssessment]) -> Vec<Finding> {
    assessments
        .iter()
        .filter_map(|assessment| assessment.automated_reasoning_policy())
        .flat_map(|policy| policy.findings())
        .filter_map(convert_finding)
        .collect()
}

pub(super) fn convert_finding(finding: &bedrock::GuardrailAutomatedReasoningFinding) -> Option<Finding> {
    use bedrock::GuardrailAutomatedReasoningFinding as Ar;

    let converted = match finding {
        Ar::Valid(f) => Finding::Valid(ValidDetails {
            translation: f.translation().map(convert_translation),
            supporting_rules: f.supporting_rules().iter().map(convert_rule).collect(),
            claims_true_scenario: f.claims_true_scenario().map(convert_scenario),
            logic_warning: f.logic_warning().map(convert_logic_warning),
        }),
        Ar::Invalid(f) => Finding::Invalid(ContradictionDetails {
            translation: f.translation().map(convert_translation),
            contradicting_rules: f.contradicting_rules().iter().map(convert_rule).collect(),
            logic_warning: f.logic_warning().map(convert_logic_warning),
        }),
        Ar::Impossible(f) => Finding::Impossible(ContradictionDetails {
            translation: f.translation().map(convert_translation),
            contradicting_rules: f.contradicting_rules().iter().map(convert_rule).collect(),
            logic_warning: f.logic_warning().map(convert_logic_warning),
        }),
        Ar::Satisfiable(f) => Finding::Satisfiable(SatisfiableDetails {
            translation: f.translation().map(convert_translation),
            claims_true_scenario: f.claims_true_scenario().map(convert_scenario),
            claims_false_scenario: f.claims_false_scenario().map(convert_scenario),
            logic_warning: f.logic_warning().map(convert_logic_warning),
        }),
        Ar::TranslationAmbiguous(f) => Finding::TranslationAmbiguous(AmbiguityDetails {
            options: f
                .options()
                .iter()
                .map(|option| TranslationOption {
                    translations: option.translations().iter().map(convert_translation).collect(),
                })
                .collect(),
            difference_scenarios: f.difference_scenarios().iter().map(convert_scenario).collect(),
        }),
        Ar::TooComplex(_) => Finding::TooComplex(TranslationDetails::default()),
        Ar::NoTranslations(_) => Finding::NoTranslations(TranslationDetails::default()),
        other => {
            warn!("Ignoring unrecognized Automated Reasoning finding: {:?}", other);
            return None;
        }
    };
    Some(converted)
}

fn convert_statement(statement: &bedrock::GuardrailAutomatedReasoningStatement) -> Statement {
    Statement::new(
        statement.logic().unwrap_or_default(),
        statement.natural_language().unwrap_or_default(),
    )
}

fn convert_statements(statements: &[bedrock::GuardrailAutomatedReasoningStatement]) -> Vec<Statement> {
    statements.iter().map(convert_statement).collect()
}

fn convert_translation(translation: &bedrock::GuardrailAutomatedReasoningTranslation) -> Translation {
    let untranslated = |refs: &[bedrock::GuardrailAutomatedReasoningInputTextReference]| {
        refs.iter()
            .filter_map(|r| r.text())
            .map(str::to_string)
            .collect()
    };
    Translation {
        premises: convert_statements(translation.premises()),
        claims: convert_statements(translation.claims()),
        untranslated_premises: untranslated(translation.untranslated_premises()),
        untranslated_claims: untranslated(translation.untranslated_claims()),
        confidence: translation.confidence(),
    }
}

fn convert_scenario(scenario: &bedrock::GuardrailAutomatedReasoningScenario) -> Scenario {
    Scenario {
        statements: convert_statements(scenario.statements()),
    }
}

fn convert_rule(rule: &bedrock::GuardrailAutomatedReasoningRule) -> RuleReference {
    RuleReference {
        identifier: rule.identifier().unwrap_or_default().to_string(),
        policy_version_arn: rule.policy_version_arn().map(str::to_string),
        content: None,
    }
}

fn convert_logic_warning(warning: &bedrock::GuardrailAutomatedReasoningLogicWarning) -> LogicWarning {
    LogicWarning {
        warning_type: warning.r#type().map(|t| t.as_str().to_string()),
        premises: convert_statements(warning.premises()),
        claims: convert_statements(warning.claims()),
    }
}
