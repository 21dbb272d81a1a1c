//! # AWS Secrets Manager Authentication
//!
//! Handles AWS SDK configuration and authentication setup.

use crate::config::HandlerConfig;
use aws_config::SdkConfig;
use tracing::info;

/// Create AWS SDK config using the default credential chain
///
/// The chain covers environment variables, shared profiles, web identity
/// (IRSA on EKS), and instance/container metadata.
pub async fn create_sdk_config(config: &HandlerConfig) -> SdkConfig {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    // Route requests to a local mock (LocalStack, moto) when an endpoint is configured
    if let Some(endpoint) = &config.endpoint_url {
        info!(
            "Routing AWS Secrets Manager requests to {}",
            endpoint
        );
        builder = builder.endpoint_url(endpoint);
    }

    builder.load().await
}
