//! Decision parsing for rewrite replies.
//!
//! A rewrite prompt asks the model to answer in one of three shapes:
//!
//! ```text
//! DECISION: REWRITE            DECISION: ASK_QUESTIONS       DECISION: IMPOSSIBLE
//! ANSWER: <new answer>         QUESTION: <question 1>        <explanation>
//!                              QUESTION: <question 2>
//! ```
//!
//! Markdown headers in front of a marker (`### DECISION: ...`) are ignored
//! and markers match case-insensitively. Replies that carry no recognizable
//! decision are treated as the rewritten answer verbatim.
//!
//! | Function | Use Case |
//! |----------|----------|
//! | [`parse_decision`] | Rewrite-loop reply → [`Decision`] |
//! | [`detect_questions`] | Scan any answer for embedded `QUESTION:` lines |

use serde::{Deserialize, Serialize};

const DECISION_PREFIX: &str = "DECISION:";
const ANSWER_PREFIX: &str = "ANSWER:";
const QUESTION_PREFIX: &str = "QUESTION:";

/// Maximum number of questions kept from one reply.
pub const MAX_QUESTIONS: usize = 5;

/// What the model decided to do about the finding it was shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Rewrite { answer: String },
    AskQuestions { questions: Vec<String> },
    Impossible { explanation: String },
}

/// Strip surrounding whitespace and leading markdown header characters.
fn clean(line: &str) -> &str {
    line.trim().trim_start_matches('#').trim()
}

/// If `line` starts with `prefix` (ignoring case), return the rest of it.
fn strip_marker<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| line[prefix.len()..].trim())
}

/// Parse a rewrite reply into a [`Decision`].
pub fn parse_decision(reply: &str) -> Decision {
    if reply.trim().is_empty() {
        return Decision::Rewrite {
            answer: String::new(),
        };
    }

    let lines: Vec<&str> = reply.lines().collect();

    // Only the first DECISION marker counts
    let marker = lines
        .iter()
        .find_map(|line| strip_marker(clean(line), DECISION_PREFIX))
        .map(|value| value.to_ascii_uppercase());

    match marker.as_deref() {
        Some(value) if value.contains("REWRITE") => Decision::Rewrite {
            answer: extract_answer(&lines),
        },
        Some(value) if value.contains("ASK_QUESTIONS") || value.contains("ASK QUESTIONS") => {
            Decision::AskQuestions {
                questions: extract_questions(&lines),
            }
        }
        Some(value) if value.contains("IMPOSSIBLE") => {
            let explanation = extract_explanation(&lines);
            Decision::Impossible {
                explanation: if explanation.is_empty() {
                    reply.trim().to_string()
                } else {
                    explanation
                },
            }
        }
        _ => Decision::Rewrite {
            answer: reply.trim().to_string(),
        },
    }
}

/// Collect the `QUESTION:` lines of an answer (at most [`MAX_QUESTIONS`]).
pub fn detect_questions(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    extract_questions(&lines)
}

/// Text after `ANSWER:` plus every following line. Without an `ANSWER:`
/// marker, every non-empty line except the decision line.
fn extract_answer(lines: &[&str]) -> String {
    let mut answer_lines: Vec<&str> = Vec::new();
    let mut found_answer = false;

    for line in lines {
        let cleaned = clean(line);
        if strip_marker(cleaned, DECISION_PREFIX).is_some() {
            continue;
        }
        if let Some(rest) = strip_marker(cleaned, ANSWER_PREFIX) {
            if !found_answer {
                // Anything collected before the marker was preamble
                answer_lines.clear();
            }
            found_answer = true;
            if !rest.is_empty() {
                answer_lines.push(rest);
            }
            continue;
        }
        if found_answer {
            answer_lines.push(line.trim_end());
        } else if !line.trim().is_empty() {
            answer_lines.push(line.trim_end());
        }
    }

    answer_lines.join("\n").trim().to_string()
}

fn extract_questions(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| strip_marker(clean(line), QUESTION_PREFIX))
        .filter(|q| !q.is_empty())
        .take(MAX_QUESTIONS)
        .map(str::to_string)
        .collect()
}

/// Non-empty lines after the decision line.
fn extract_explanation(lines: &[&str]) -> String {
    lines
        .iter()
        .skip_while(|line| strip_marker(clean(line), DECISION_PREFIX).is_none())
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
