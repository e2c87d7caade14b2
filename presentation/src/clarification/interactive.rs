//! Terminal prompt for a paused thread's clarification questions.
//!
//! ```text
//! ─── Clarification needed ───
//!
//! Your question depends on details only you can provide.
//! Answer each question, or type /skip to continue without answering.
//!
//! [1/2] Are you a full-time employee?
//! answer> yes
//! [2/2] How many years have you worked here?
//! answer> 3
//! ```
//!
//! | Command | Aliases | Description |
//! |---------|---------|-------------|
//! | `/skip` | `skip`, `s` | Continue without answering |
//!
//! Blank answers are re-prompted. End of input is treated as `/skip`.

use colored::Colorize;
use std::io::{self, BufRead, Write};

/// What the user chose to do with a round of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarificationReply {
    /// One answer per question, in order
    Answers(Vec<String>),
    Skip,
}

pub struct InteractiveClarification<R, W> {
    input: R,
    output: W,
}

impl InteractiveClarification<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> InteractiveClarification<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Show the questions and collect a reply.
    pub fn ask(&mut self, questions: &[String]) -> io::Result<ClarificationReply> {
        self.display_prompt()?;

        let mut answers = Vec::with_capacity(questions.len());
        for (i, question) in questions.iter().enumerate() {
            writeln!(
                self.output,
                "{} {}",
                format!("[{}/{}]", i + 1, questions.len()).dimmed(),
                question.bold()
            )?;

            loop {
                let Some(line) = self.read_line()? else {
                    return Ok(ClarificationReply::Skip);
                };
                match line.to_lowercase().as_str() {
                    "/skip" | "skip" | "s" => return Ok(ClarificationReply::Skip),
                    "" => {
                        writeln!(self.output, "{}", "Please enter an answer (or /skip).".yellow())?;
                    }
                    _ => {
                        answers.push(line);
                        break;
                    }
                }
            }
        }

        writeln!(self.output)?;
        Ok(ClarificationReply::Answers(answers))
    }

    fn display_prompt(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", "─── Clarification needed ───".yellow().bold())?;
        writeln!(self.output)?;
        writeln!(
            self.output,
            "Your question depends on details only you can provide."
        )?;
        writeln!(
            self.output,
            "Answer each question, or type {} to continue without answering.",
            "/skip".yellow()
        )?;
        writeln!(self.output)
    }

    /// `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "{} ", "answer>".magenta().bold())?;
        self.output.flush()?;

        let mut input = String::new();
        if self.input.read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    }
}
