//! Policy context block injected into generation prompts.

use super::definition::PolicyDefinition;

/// Render the rules and variables of a policy as a markdown block.
///
/// ```text
/// ## Policy Context
///
/// ### Rules
/// - rule-1: All employees must have a badge
///
/// ### Variables
/// - is_employee: Whether the person is an employee
/// ```
///
/// Rules use their alternate (natural-language) expression, falling back to
/// the formal expression. Entries missing a name or text are skipped. An
/// empty policy renders as an empty string.
pub fn format_policy_context(definition: &PolicyDefinition) -> String {
    let rules: Vec<String> = definition
        .rules
        .iter()
        .filter_map(|rule| {
            let text = if rule.alternate_expression.is_empty() {
                &rule.expression
            } else {
                &rule.alternate_expression
            };
            (!rule.id.is_empty() && !text.is_empty()).then(|| format!("- {}: {}", rule.id, text))
        })
        .collect();

    let variables: Vec<String> = definition
        .variables
        .iter()
        .filter(|v| !v.name.is_empty() && !v.description.is_empty())
        .map(|v| format!("- {}: {}", v.name, v.description))
        .collect();

    if rules.is_empty() && variables.is_empty() {
        return String::new();
    }

    let mut sections = vec!["## Policy Context".to_string()];
    if !rules.is_empty() {
        sections.push("\n### Rules".to_string());
        sections.extend(rules);
    }
    if !variables.is_empty() {
        sections.push("\n### Variables".to_string());
        sections.extend(variables);
    }
    sections.join("\n")
}
