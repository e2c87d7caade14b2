//! Remote service adapters.

pub mod bedrock;
