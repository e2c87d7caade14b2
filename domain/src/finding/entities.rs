//! Finding union and the result of one validation pass.

use super::details::{
    AmbiguityDetails, ContradictionDetails, LogicWarning, RuleReference, SatisfiableDetails,
    Translation, TranslationDetails, ValidDetails,
};
use super::kind::ValidationKind;
use super::ordering::sort_findings;
use serde::{Deserialize, Serialize};

/// One structured result of checking a candidate answer against a policy.
///
/// The variant is the validation kind; the payload shape depends on it.
/// Serialized as `{"validation_output": "INVALID", "details": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "validation_output",
    content = "details",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum Finding {
    TranslationAmbiguous(AmbiguityDetails),
    Impossible(ContradictionDetails),
    Invalid(ContradictionDetails),
    Satisfiable(SatisfiableDetails),
    NoTranslations(TranslationDetails),
    Valid(ValidDetails),
    TooComplex(TranslationDetails),
}

impl Finding {
    pub fn kind(&self) -> ValidationKind {
        match self {
            Finding::TranslationAmbiguous(_) => ValidationKind::TranslationAmbiguous,
            Finding::Impossible(_) => ValidationKind::Impossible,
            Finding::Invalid(_) => ValidationKind::Invalid,
            Finding::Satisfiable(_) => ValidationKind::Satisfiable,
            Finding::NoTranslations(_) => ValidationKind::NoTranslations,
            Finding::Valid(_) => ValidationKind::Valid,
            Finding::TooComplex(_) => ValidationKind::TooComplex,
        }
    }

    pub fn priority(&self) -> u16 {
        self.kind().priority()
    }

    pub fn translation(&self) -> Option<&Translation> {
        match self {
            Finding::Impossible(d) | Finding::Invalid(d) => d.translation.as_ref(),
            Finding::Satisfiable(d) => d.translation.as_ref(),
            Finding::Valid(d) => d.translation.as_ref(),
            Finding::NoTranslations(d) | Finding::TooComplex(d) => d.translation.as_ref(),
            Finding::TranslationAmbiguous(_) => None,
        }
    }

    pub fn logic_warning(&self) -> Option<&LogicWarning> {
        match self {
            Finding::Impossible(d) | Finding::Invalid(d) => d.logic_warning.as_ref(),
            Finding::Satisfiable(d) => d.logic_warning.as_ref(),
            Finding::Valid(d) => d.logic_warning.as_ref(),
            _ => None,
        }
    }

    /// Rule references cited by this finding (supporting or contradicting).
    pub fn rules(&self) -> &[RuleReference] {
        match self {
            Finding::Impossible(d) | Finding::Invalid(d) => &d.contradicting_rules,
            Finding::Valid(d) => &d.supporting_rules,
            _ => &[],
        }
    }

    pub(crate) fn rules_mut(&mut self) -> Option<&mut Vec<RuleReference>> {
        match self {
            Finding::Impossible(d) | Finding::Invalid(d) => Some(&mut d.contradicting_rules),
            Finding::Valid(d) => Some(&mut d.supporting_rules),
            _ => None,
        }
    }
}

/// Outcome of one validation pass: the overall kind plus its findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub output: ValidationKind,
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// Derive the overall kind from `findings` and store them in priority order.
    ///
    /// No findings means the answer is `VALID`.
    pub fn from_findings(mut findings: Vec<Finding>) -> Self {
        let output = findings
            .iter()
            .map(Finding::kind)
            .min_by_key(ValidationKind::report_rank)
            .unwrap_or(ValidationKind::Valid);
        sort_findings(&mut findings);
        Self { output, findings }
    }

    /// A `VALID` pass that also contains parts the policy does not cover.
    pub fn has_uncovered_parts(&self) -> bool {
        self.output == ValidationKind::Valid
            && self
                .findings
                .iter()
                .any(|f| f.kind() == ValidationKind::NoTranslations)
    }

    /// Every finding is `NO_TRANSLATIONS` (and there is at least one).
    pub fn is_entirely_uncovered(&self) -> bool {
        !self.findings.is_empty()
            && self
                .findings
                .iter()
                .all(|f| f.kind() == ValidationKind::NoTranslations)
    }
}
