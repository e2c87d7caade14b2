//! Use cases for the application layer

pub mod process_thread;
pub mod rewrite_service;
pub(crate) mod shared;
#[cfg(test)]
pub(crate) mod testing;
pub mod timeout_sweeper;
