//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for thread snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary with the iteration log
    Text,
    /// The full snapshot as JSON
    Json,
}

/// CLI arguments for policy-rewriter
#[derive(Parser, Debug)]
#[command(name = "policy-rewriter")]
#[command(author, version, about = "Validate answers against an Automated Reasoning policy and rewrite them until they hold")]
#[command(long_about = r#"
policy-rewriter answers a question with an LLM, checks the answer against a
formal policy (Bedrock Automated Reasoning checks) and rewrites it, one
finding at a time, until the answer is valid or the rewrite budget runs out.
When the answer depends on facts only the user knows, the thread pauses with
clarification questions.

Configuration files are loaded from (in priority order):
1. REWRITER_<SECTION>__<KEY>   Environment variables
2. --config <path>             Explicit config file
3. ./rewriter.toml             Project-level config
4. ~/.config/policy-rewriter/config.toml   Global config

Example:
  policy-rewriter ask "Can I carry over unused vacation days?"
  policy-rewriter ask --interactive "Am I eligible for parental leave?"
  policy-rewriter answer 3f2c... --answer "Full time" --answer "2 years"
  policy-rewriter show 3f2c... --format json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format (defaults to the config file's [output] format)
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a question and validate/rewrite the answer
    Ask(AskArgs),
    /// Resume a thread that is waiting for clarification
    Answer(AnswerArgs),
    /// Print a thread
    Show {
        /// Thread id
        thread_id: String,
    },
    /// Skip clarification on threads that have waited too long
    Sweep {
        /// Keep sweeping on the configured interval until Ctrl-C
        #[arg(short, long)]
        watch: bool,
    },
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    pub prompt: String,

    /// Answer clarification questions on the terminal instead of pausing
    #[arg(short, long)]
    pub interactive: bool,

    /// Print the thread id as soon as the thread is created
    #[arg(short, long, conflicts_with = "interactive")]
    pub detach: bool,
}

#[derive(Args, Debug)]
pub struct AnswerArgs {
    /// Thread id
    pub thread_id: String,

    /// One answer per pending question, in order
    #[arg(short, long = "answer", value_name = "TEXT")]
    pub answers: Vec<String>,

    /// Continue without answering
    #[arg(long, conflicts_with = "answers")]
    pub skip: bool,
}
