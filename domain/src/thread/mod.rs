//! Threads: the unit of work of the validate-and-rewrite loop.
//!
//! A [`Thread`] is created per user prompt and mutated only by the worker
//! that currently owns it. Its [`Iteration`] log is append-only, except that
//! a paused clarification iteration gets its answer half filled in once on
//! resume.

pub mod entities;
pub mod snapshot;
pub mod state;
pub mod value_objects;

pub use entities::{
    ArFeedback, Clarification, Iteration, IterationKind, LlmDecision, Thread, ThreadStatus,
};
pub use snapshot::ThreadSnapshot;
pub use state::ProcessingState;
pub use value_objects::{QuestionAnswerExchange, ThreadId};
