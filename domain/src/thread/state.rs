//! States of the thread orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the orchestrator is in processing a thread.
///
/// ```text
/// Init → GenerateInitial → Validate → CheckQuestions → HandleResult → RewritingLoop
///                                          │                │              │ ↺
///                                          └────────────────┴──────────────┴→ AwaitingInput | Completed | Error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    Init,
    GenerateInitial,
    Validate,
    CheckQuestions,
    HandleResult,
    RewritingLoop,
    AwaitingInput,
    Completed,
    Error,
}

impl ProcessingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingState::Init => "init",
            ProcessingState::GenerateInitial => "generate_initial",
            ProcessingState::Validate => "validate",
            ProcessingState::CheckQuestions => "check_questions",
            ProcessingState::HandleResult => "handle_result",
            ProcessingState::RewritingLoop => "rewriting_loop",
            ProcessingState::AwaitingInput => "awaiting_input",
            ProcessingState::Completed => "completed",
            ProcessingState::Error => "error",
        }
    }

    /// States at which the current worker stops.
    pub fn is_stop(&self) -> bool {
        matches!(
            self,
            ProcessingState::AwaitingInput | ProcessingState::Completed | ProcessingState::Error
        )
    }
}

impl fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
