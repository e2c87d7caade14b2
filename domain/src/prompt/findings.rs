//! Human-readable rendering of findings for rewrite prompts.

use super::scenario::{disagreeing_variables, filter_statements};
use crate::finding::{Finding, LogicWarning, RuleReference, Scenario, Statement, Translation};

fn statement_text(stmt: &Statement) -> &str {
    if stmt.natural_language.is_empty() {
        &stmt.logic
    } else {
        &stmt.natural_language
    }
}

fn push_numbered(lines: &mut Vec<String>, heading: &str, statements: &[Statement]) {
    if statements.is_empty() {
        return;
    }
    lines.push(format!("\n{}", heading));
    for (i, stmt) in statements.iter().enumerate() {
        let text = statement_text(stmt);
        if !text.is_empty() {
            lines.push(format!("  {}. {}", i + 1, text));
        }
    }
}

fn push_bullets<'a>(
    lines: &mut Vec<String>,
    heading: &str,
    indent: &str,
    statements: impl IntoIterator<Item = &'a Statement>,
) {
    lines.push(heading.to_string());
    for stmt in statements {
        let text = statement_text(stmt);
        if !text.is_empty() {
            lines.push(format!("{}- {}", indent, text));
        }
    }
}

fn push_translation(lines: &mut Vec<String>, translation: &Translation) {
    push_numbered(
        lines,
        "What the system understood as given facts (premises):",
        &translation.premises,
    );
    push_numbered(
        lines,
        "What the system understood as your claims:",
        &translation.claims,
    );
    if let Some(confidence) = translation.confidence {
        lines.push(format!(
            "\nConfidence in this interpretation: {:.1}%",
            confidence * 100.0
        ));
    }
}

fn push_rules(lines: &mut Vec<String>, heading: &str, rules: &[RuleReference]) {
    if rules.is_empty() {
        return;
    }
    lines.push(format!("\n{}", heading));
    for rule in rules {
        match &rule.content {
            Some(content) => {
                lines.push(format!("  - Rule {}: {}", rule.identifier, rule.display_text()));
                if !content.description.is_empty() {
                    lines.push(format!("    ({})", content.description));
                }
            }
            None => lines.push(format!("  - Rule ID: {}", rule.identifier)),
        }
    }
}

fn push_scenario_pair(lines: &mut Vec<String>, claims_true: &Scenario, claims_false: &Scenario) {
    let variables = disagreeing_variables(claims_true, claims_false);
    if variables.is_empty() {
        push_bullets(
            lines,
            "\nScenario where your claims would be TRUE:",
            "  ",
            &claims_true.statements,
        );
        push_bullets(
            lines,
            "\nScenario where your claims would be FALSE:",
            "  ",
            &claims_false.statements,
        );
        return;
    }

    lines.push("\nThe following variables have different values between scenarios:".to_string());
    lines.push("(These represent the unstated assumptions causing ambiguity)".to_string());
    push_bullets(
        lines,
        "\nScenario where your claims would be TRUE:",
        "  ",
        filter_statements(claims_true, &variables),
    );
    push_bullets(
        lines,
        "\nScenario where your claims would be FALSE:",
        "  ",
        filter_statements(claims_false, &variables),
    );
}

fn push_logic_warning(lines: &mut Vec<String>, warning: &LogicWarning) {
    lines.push(format!(
        "\nLogic Warning: {}",
        warning.warning_type.as_deref().unwrap_or("Unknown")
    ));
    if !warning.premises.is_empty() {
        push_bullets(lines, "  Affected premises:", "    ", &warning.premises);
    }
    if !warning.claims.is_empty() {
        push_bullets(lines, "  Affected claims:", "    ", &warning.claims);
    }
}

fn format_finding(index: usize, finding: &Finding) -> String {
    let mut lines = vec![format!("Finding {}: {}", index, finding.kind())];

    if let Some(translation) = finding.translation() {
        push_translation(&mut lines, translation);
    }

    match finding {
        Finding::Valid(details) => {
            push_rules(&mut lines, "Supporting policy rules:", &details.supporting_rules);
            if let Some(scenario) = &details.claims_true_scenario {
                push_bullets(
                    &mut lines,
                    "\nScenario where your claims would be TRUE:",
                    "  ",
                    &scenario.statements,
                );
            }
        }
        Finding::Invalid(details) | Finding::Impossible(details) => {
            push_rules(
                &mut lines,
                "Your response contradicts these policy rules:",
                &details.contradicting_rules,
            );
        }
        Finding::Satisfiable(details) => {
            match (&details.claims_true_scenario, &details.claims_false_scenario) {
                (Some(t), Some(f)) => push_scenario_pair(&mut lines, t, f),
                (Some(t), None) => push_bullets(
                    &mut lines,
                    "\nScenario where your claims would be TRUE:",
                    "  ",
                    &t.statements,
                ),
                (None, Some(f)) => push_bullets(
                    &mut lines,
                    "\nScenario where your claims would be FALSE:",
                    "  ",
                    &f.statements,
                ),
                (None, None) => {}
            }
        }
        Finding::TranslationAmbiguous(details) => {
            if !details.options.is_empty() {
                lines.push("\nPossible interpretations of your response:".to_string());
                for (i, option) in details.options.iter().enumerate() {
                    lines.push(format!("\nInterpretation {}:", i + 1));
                    for translation in &option.translations {
                        if !translation.premises.is_empty() {
                            push_bullets(&mut lines, "  Premises:", "    ", &translation.premises);
                        }
                        if !translation.claims.is_empty() {
                            push_bullets(&mut lines, "  Claims:", "    ", &translation.claims);
                        }
                    }
                }
            }
            for (i, scenario) in details.difference_scenarios.iter().enumerate() {
                push_bullets(
                    &mut lines,
                    &format!("\nWhere the interpretations differ ({}):", i + 1),
                    "  ",
                    &scenario.statements,
                );
            }
        }
        Finding::NoTranslations(_) | Finding::TooComplex(_) => {}
    }

    if let Some(warning) = finding.logic_warning() {
        push_logic_warning(&mut lines, warning);
    }

    lines.join("\n")
}

/// Render findings as numbered, readable blocks separated by blank lines.
pub fn format_findings(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "No specific findings provided.".to_string();
    }
    findings
        .iter()
        .enumerate()
        .map(|(i, finding)| format_finding(i + 1, finding))
        .collect::<Vec<_>>()
        .join("\n\n")
}
