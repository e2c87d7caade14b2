//! Thread storage adapters for the
//! [`ThreadRepository`](rewriter_application::ThreadRepository) port.
//!
//! [`InMemoryThreadRepository`] lives as long as the process;
//! [`JsonFileThreadRepository`] keeps one JSON document per thread so a
//! paused thread can be answered from a later invocation.

mod json_file;
mod memory;

pub use json_file::JsonFileThreadRepository;
pub use memory::InMemoryThreadRepository;
