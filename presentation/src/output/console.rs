//! Console output formatter for threads

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use rewriter_domain::{IterationKind, ThreadSnapshot, ThreadStatus};

/// Formats thread snapshots for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete thread
    pub fn format(snapshot: &ThreadSnapshot) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Policy Rewriter"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Thread:".cyan().bold(),
            snapshot.thread_id
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Status:".cyan().bold(),
            Self::status_label(snapshot.status)
        ));
        output.push_str(&format!("{} {}\n", "Model:".cyan().bold(), snapshot.model_id));
        output.push_str(&format!(
            "{} {}/{}\n\n",
            "Rewrites:".cyan().bold(),
            snapshot.iteration_counter,
            snapshot.max_iterations
        ));

        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            snapshot.user_prompt
        ));

        if !snapshot.iterations.is_empty() {
            output.push_str(&Self::section_header("Iterations"));
            for iteration in &snapshot.iterations {
                let validation = iteration
                    .validation_output()
                    .map(|kind| kind.as_str())
                    .unwrap_or("-");
                let label = match &iteration.kind {
                    IterationKind::ArFeedback(_) => "feedback",
                    IterationKind::UserClarification(_) => "clarification",
                };
                output.push_str(&format!(
                    "  #{:<3} {:<14} {:<14} {}\n",
                    iteration.number,
                    label,
                    iteration.llm_decision().as_str(),
                    validation.dimmed()
                ));
                if let IterationKind::UserClarification(clarification) = &iteration.kind {
                    if clarification.qa_exchange.skipped {
                        output.push_str(&format!("       {}\n", "(questions skipped)".dimmed()));
                    }
                    for (question, answer) in clarification.qa_exchange.pairs() {
                        output.push_str(&format!("       Q: {}\n       A: {}\n", question, answer));
                    }
                }
            }
        }

        if let Some(questions) = &snapshot.pending_questions {
            output.push_str(&Self::section_header("Waiting for Answers"));
            for (i, question) in questions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, question));
            }
            output.push_str(&format!(
                "\n{}\n",
                format!(
                    "Reply with: policy-rewriter answer {} --answer <TEXT> ...",
                    snapshot.thread_id
                )
                .dimmed()
            ));
        }

        if let Some(response) = &snapshot.final_response {
            output.push_str(&Self::section_header("Final Answer"));
            output.push_str(&format!("\n{}\n", response));
        }

        if let Some(warning) = &snapshot.warning_message {
            output.push_str(&format!("\n{} {}\n", "Warning:".yellow().bold(), warning));
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(snapshot: &ThreadSnapshot) -> String {
        serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final answer only
    pub fn format_response_only(snapshot: &ThreadSnapshot) -> String {
        let mut output = String::new();

        match &snapshot.final_response {
            Some(response) => {
                output.push_str(response);
                output.push('\n');
            }
            None => {
                output.push_str(&format!(
                    "{} {}\n",
                    "Status:".bold(),
                    Self::status_label(snapshot.status)
                ));
            }
        }

        if let Some(warning) = &snapshot.warning_message {
            output.push_str(&format!("\n{} {}\n", "Warning:".yellow().bold(), warning));
        }

        output
    }

    fn status_label(status: ThreadStatus) -> ColoredString {
        match status {
            ThreadStatus::Processing => status.as_str().blue(),
            ThreadStatus::AwaitingUserInput => status.as_str().yellow(),
            ThreadStatus::Completed => status.as_str().green(),
            ThreadStatus::Error => status.as_str().red(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, snapshot: &ThreadSnapshot) -> String {
        Self::format(snapshot)
    }

    fn format_json(&self, snapshot: &ThreadSnapshot) -> String {
        Self::format_json(snapshot)
    }

    fn format_response_only(&self, snapshot: &ThreadSnapshot) -> String {
        Self::format_response_only(snapshot)
    }
}
