//! Ports: interfaces the application layer needs from the outside world.

pub mod audit_sink;
pub mod llm_gateway;
pub mod progress;
pub mod thread_repository;
pub mod validation_gateway;
