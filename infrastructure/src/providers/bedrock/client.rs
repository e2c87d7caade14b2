//! Bedrock Runtime client construction.

use crate::config::FileBedrockConfig;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use std::sync::Arc;
use tracing::info;

/// Resolve AWS credentials for the configured region/profile and build a
/// Bedrock Runtime client.
pub async fn load_client(config: &FileBedrockConfig) -> Arc<BedrockClient> {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(ref profile) = config.profile {
        loader = loader.profile_name(profile);
    }

    let aws_config = loader.load().await;
    info!(region = %config.region, profile = ?config.profile, "Bedrock client initialized");
    Arc::new(BedrockClient::new(&aws_config))
}
