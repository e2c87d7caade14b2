//! Progress display while a thread is processed.

pub mod reporter;
