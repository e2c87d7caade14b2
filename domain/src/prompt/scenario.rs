//! Scenario comparison for `SATISFIABLE` findings.
//!
//! A satisfiable finding carries one scenario where the claims hold and one
//! where they fail. Only the variables whose values differ between the two
//! matter to the rewrite: they are the unstated assumptions.

use crate::finding::{Scenario, Statement};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

/// `(= var value)`
static SEXP_EQUALITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\s*=\s+(\w+)").expect("valid regex"));
/// `(pred var)`
static SEXP_PREDICATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\s*\w+\s+(\w+)").expect("valid regex"));
/// `fn(var, ...)`
static CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+\((\w+)").expect("valid regex"));
/// `var = value`, `var > 0`
static COMPARISON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s*[=<>!]").expect("valid regex"));
static LEADING_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+)").expect("valid regex"));

/// Extract the variable a statement talks about from its logic text.
///
/// Returns an empty string for empty logic and the whole (whitespace
/// normalized) logic when no pattern matches.
pub fn extract_variable(statement: &Statement) -> String {
    let logic = statement.logic.split_whitespace().collect::<Vec<_>>().join(" ");
    if logic.is_empty() {
        return String::new();
    }

    [
        &*SEXP_EQUALITY,
        &*SEXP_PREDICATE,
        &*CALL,
        &*COMPARISON,
        &*LEADING_WORD,
    ]
    .iter()
    .find_map(|re| re.captures(&logic).map(|caps| caps[1].to_string()))
    .unwrap_or(logic)
}

fn variable_values(scenario: &Scenario) -> HashMap<String, &str> {
    scenario
        .statements
        .iter()
        .filter_map(|stmt| {
            let var = extract_variable(stmt);
            (!var.is_empty()).then_some((var, stmt.logic.as_str()))
        })
        .collect()
}

/// Variables present in both scenarios with different logic.
pub fn disagreeing_variables(claims_true: &Scenario, claims_false: &Scenario) -> BTreeSet<String> {
    let true_vars = variable_values(claims_true);
    let false_vars = variable_values(claims_false);

    true_vars
        .iter()
        .filter(|(var, logic)| false_vars.get(*var).is_some_and(|other| other != *logic))
        .map(|(var, _)| var.clone())
        .collect()
}

/// Statements of `scenario` whose variable is in `variables`.
pub fn filter_statements<'a>(
    scenario: &'a Scenario,
    variables: &BTreeSet<String>,
) -> Vec<&'a Statement> {
    scenario
        .statements
        .iter()
        .filter(|stmt| variables.contains(&extract_variable(stmt)))
        .collect()
}
