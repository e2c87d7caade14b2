//! Ordering and selection of findings for the rewrite loop.

use super::entities::Finding;
use std::collections::HashSet;

/// Sort findings by [`ValidationKind::priority`](super::ValidationKind::priority).
///
/// The sort is stable: findings of equal priority keep their input order.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by_key(Finding::priority);
}

/// Pick the single highest-priority finding whose index is not in `processed`.
///
/// Returns the index into `findings` together with the finding. Ties go to
/// the earliest index.
pub fn select_next<'a>(
    findings: &'a [Finding],
    processed: &HashSet<usize>,
) -> Option<(usize, &'a Finding)> {
    findings
        .iter()
        .enumerate()
        .filter(|(index, _)| !processed.contains(index))
        .min_by_key(|(index, finding)| (finding.priority(), *index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::details::{
        AmbiguityDetails, ContradictionDetails, RuleReference, SatisfiableDetails,
        TranslationDetails, ValidDetails,
    };
    use crate::finding::kind::ValidationKind;

    fn invalid(rule: &str) -> Finding {
        Finding::Invalid(ContradictionDetails {
            contradicting_rules: vec![RuleReference::new(rule)],
            ..Default::default()
        })
    }

    fn kinds(findings: &[Finding]) -> Vec<ValidationKind> {
        findings.iter().map(Finding::kind).collect()
    }

    #[test]
    fn test_sort_matches_priority_table() {
        let mut findings = vec![
            Finding::Valid(ValidDetails::default()),
            Finding::NoTranslations(TranslationDetails::default()),
            Finding::Satisfiable(SatisfiableDetails::default()),
            invalid("R1"),
            Finding::Impossible(ContradictionDetails::default()),
            Finding::TranslationAmbiguous(AmbiguityDetails::default()),
        ];
        sort_findings(&mut findings);
        assert_eq!(
            kinds(&findings),
            vec![
                ValidationKind::TranslationAmbiguous,
                ValidationKind::Impossible,
                ValidationKind::Invalid,
                ValidationKind::Satisfiable,
                ValidationKind::NoTranslations,
                ValidationKind::Valid,
            ]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let mut findings = vec![
            invalid("first"),
            Finding::TranslationAmbiguous(AmbiguityDetails::default()),
            invalid("second"),
            invalid("third"),
        ];
        sort_findings(&mut findings);
        let rule_order: Vec<&str> = findings
            .iter()
            .flat_map(|f| f.rules().iter().map(|r| r.identifier.as_str()))
            .collect();
        assert_eq!(rule_order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_select_next_skips_processed() {
        let findings = vec![
            invalid("R1"),
            Finding::TranslationAmbiguous(AmbiguityDetails::default()),
            Finding::Satisfiable(SatisfiableDetails::default()),
        ];

        let mut processed = HashSet::new();
        let (index, finding) = select_next(&findings, &processed).unwrap();
        assert_eq!(index, 1);
        assert_eq!(finding.kind(), ValidationKind::TranslationAmbiguous);

        processed.insert(1);
        let (index, _) = select_next(&findings, &processed).unwrap();
        assert_eq!(index, 0);

        processed.insert(0);
        processed.insert(2);
        assert!(select_next(&findings, &processed).is_none());
    }

    #[test]
    fn test_select_next_has_minimal_priority() {
        let findings = vec![
            Finding::Satisfiable(SatisfiableDetails::default()),
            invalid("A"),
            invalid("B"),
            Finding::Impossible(ContradictionDetails::default()),
        ];
        let processed = HashSet::from([3]);
        let (index, selected) = select_next(&findings, &processed).unwrap();
        assert_eq!(index, 1);
        for (i, other) in findings.iter().enumerate() {
            if !processed.contains(&i) {
                assert!(selected.priority() <= other.priority());
            }
        }
    }
}
