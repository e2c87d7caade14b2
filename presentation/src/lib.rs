//! Presentation layer for policy-rewriter
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the terminal clarification prompt.

pub mod clarification;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use clarification::interactive::{ClarificationReply, InteractiveClarification};
pub use cli::commands::{AnswerArgs, AskArgs, Cli, Command, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
