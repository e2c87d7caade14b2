//! AWS Bedrock adapters
//!
//! Generation goes through the Converse API; validation through
//! ApplyGuardrail with a guardrail that carries an Automated Reasoning
//! policy. Both share one SDK client built by [`load_client`].

mod client;
mod convert;
mod errors;
mod generation;
mod guardrail;
mod model_map;

pub use client::load_client;
pub use generation::BedrockGenerationGateway;
pub use guardrail::BedrockGuardrailValidator;
pub use model_map::invocation_model_id;
