//! Parsing of generation replies into rewrite-loop decisions.

pub mod parser;

pub use parser::{Decision, MAX_QUESTIONS, detect_questions, parse_decision};
