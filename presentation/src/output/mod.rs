//! Thread snapshot formatting.

pub mod console;
pub mod formatter;
