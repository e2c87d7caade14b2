//! Context blocks built from clarification exchanges.

use crate::thread::QuestionAnswerExchange;

/// Render one answered round as a `**Previous Clarification:**` block.
///
/// Pairs with an empty question or answer are dropped. Returns an empty
/// string when there is nothing to show.
pub fn context_augmentation(questions: &[String], answers: &[String]) -> String {
    let pairs: Vec<String> = questions
        .iter()
        .zip(answers)
        .filter_map(|(q, a)| format_pair(q, a))
        .collect();
    if pairs.is_empty() {
        return String::new();
    }

    let mut lines = vec!["**Previous Clarification:**".to_string(), String::new()];
    lines.extend(pairs);
    lines.join("\n")
}

/// Render every answered round of a thread.
///
/// Skipped rounds and rounds with only blank answers are left out. With
/// more than one round each gets a `Clarification Round N:` header.
pub fn all_clarifications_context(exchanges: &[QuestionAnswerExchange]) -> String {
    let answered: Vec<&QuestionAnswerExchange> = exchanges
        .iter()
        .filter(|qa| !qa.skipped && qa.pairs().any(|(q, a)| format_pair(q, a).is_some()))
        .collect();
    if answered.is_empty() {
        return String::new();
    }

    let numbered = answered.len() > 1;
    let mut lines = vec!["**Previous Clarifications:**".to_string(), String::new()];
    for (round, exchange) in answered.iter().enumerate() {
        if numbered {
            lines.push(format!("Clarification Round {}:", round + 1));
        }
        lines.extend(exchange.pairs().filter_map(|(q, a)| format_pair(q, a)));
        if numbered {
            lines.push(String::new());
        }
    }
    lines.join("\n")
}

fn format_pair(question: &str, answer: &str) -> Option<String> {
    let (q, a) = (question.trim(), answer.trim());
    (!q.is_empty() && !a.is_empty()).then(|| format!("Q: {}\nA: {}\n", q, a))
}
