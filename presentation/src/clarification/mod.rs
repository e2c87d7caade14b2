//! Terminal prompt for clarification questions.

pub mod interactive;
