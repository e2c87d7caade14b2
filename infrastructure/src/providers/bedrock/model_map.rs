//! Bedrock model id resolution
//!
//! Some models cannot be invoked on-demand and must be called through a
//! cross-region inference profile, whose id is the model id prefixed with
//! the region group (`us.`, `eu.`, ...).

const REGION_GROUPS: [&str; 7] = ["us", "eu", "ap", "me", "sa", "ca", "af"];

/// The id to pass to the Converse API for `model_id`.
///
/// ARNs and ids that already carry a region-group prefix are used as-is.
pub fn invocation_model_id(model_id: &str, requires_inference_profile: bool, region: &str) -> String {
    if !requires_inference_profile || model_id.starts_with("arn:") || has_profile_prefix(model_id) {
        return model_id.to_string();
    }
    format!("{}.{}", inference_profile_prefix(region), model_id)
}

fn has_profile_prefix(model_id: &str) -> bool {
    model_id
        .split_once('.')
        .is_some_and(|(head, _)| REGION_GROUPS.contains(&head))
}

/// Derive the inference profile region group from an AWS region string.
///
/// `us-east-1` → `us`, `eu-west-1` → `eu`, `ap-northeast-1` → `ap`, etc.
fn inference_profile_prefix(region: &str) -> &str {
    match region.split('-').next() {
        Some(prefix) if REGION_GROUPS.contains(&prefix) => prefix,
        _ => "us",
    }
}
