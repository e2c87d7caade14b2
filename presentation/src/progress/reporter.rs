//! Progress reporting while a thread is processed

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rewriter_application::ThreadProgressNotifier;
use rewriter_domain::{ProcessingState, ThreadId, ThreadStatus, ValidationKind};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with a spinner that follows the orchestrator state
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub(crate) fn state_display_name(state: ProcessingState) -> &'static str {
        match state {
            ProcessingState::Init => "Starting",
            ProcessingState::GenerateInitial => "Generating answer",
            ProcessingState::Validate => "Validating",
            ProcessingState::CheckQuestions => "Checking for questions",
            ProcessingState::HandleResult => "Reviewing findings",
            ProcessingState::RewritingLoop => "Rewriting",
            ProcessingState::AwaitingInput => "Waiting for answers",
            ProcessingState::Completed => "Completed",
            ProcessingState::Error => "Failed",
        }
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        let spinner = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        f(spinner);
    }

    fn finish(&self, message: String) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_with_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadProgressNotifier for ProgressReporter {
    fn on_state_change(&self, _thread_id: &ThreadId, state: ProcessingState) {
        if state.is_stop() {
            return;
        }
        self.with_spinner(|pb| {
            pb.set_prefix(Self::state_display_name(state));
            pb.set_message("");
        });
    }

    fn on_validated(&self, _thread_id: &ThreadId, output: ValidationKind, findings: usize) {
        self.with_spinner(|pb| {
            pb.set_message(format!("{} ({} findings)", output.as_str(), findings));
        });
    }

    fn on_rewrite(&self, _thread_id: &ThreadId, attempt: usize, max: usize, kind: ValidationKind) {
        self.with_spinner(|pb| {
            pb.set_message(format!("attempt {}/{} for {}", attempt, max, kind.as_str()));
        });
    }

    fn on_paused(&self, _thread_id: &ThreadId, questions: &[String]) {
        self.finish(format!(
            "{} ({} questions)",
            "Clarification needed".yellow(),
            questions.len()
        ));
    }

    fn on_terminal(&self, _thread_id: &ThreadId, status: ThreadStatus) {
        let message = match status {
            ThreadStatus::Completed => "Done".green().to_string(),
            other => other.as_str().red().to_string(),
        };
        self.finish(message);
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ThreadProgressNotifier for SimpleProgress {
    fn on_state_change(&self, thread_id: &ThreadId, state: ProcessingState) {
        if matches!(state, ProcessingState::Init) {
            println!("{} {}", "->".cyan(), format!("Thread {}", thread_id).bold());
        }
    }

    fn on_validated(&self, _thread_id: &ThreadId, output: ValidationKind, findings: usize) {
        let label = if output == ValidationKind::Valid {
            output.as_str().green()
        } else {
            output.as_str().yellow()
        };
        println!("  {} {} ({} findings)", "v".cyan(), label, findings);
    }

    fn on_rewrite(&self, _thread_id: &ThreadId, attempt: usize, max: usize, kind: ValidationKind) {
        println!("  {} rewrite {}/{} for {}", "->".cyan(), attempt, max, kind.as_str());
    }

    fn on_paused(&self, _thread_id: &ThreadId, questions: &[String]) {
        println!(
            "  {} clarification needed ({} questions)",
            "?".yellow(),
            questions.len()
        );
    }

    fn on_terminal(&self, _thread_id: &ThreadId, status: ThreadStatus) {
        match status {
            ThreadStatus::Completed => println!("  {} {}", "v".green(), status),
            other => println!("  {} {}", "x".red(), other),
        }
        println!();
    }
}
