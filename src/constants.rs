//! # Constants
//!
//! Default values shared by the configuration layer and the handler.

/// Default AWS region when `AWS_REGION` is not set
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Default lifetime of a cached secret value (24 hours)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Default tracing filter for the binaries
pub const DEFAULT_LOG_FILTER: &str = "aws_secret_handler=info,secretctl=info";

/// Environment variable overriding the AWS region
pub const ENV_AWS_REGION: &str = "AWS_REGION";

/// Environment variable routing Secrets Manager requests to another endpoint (e.g. a local mock)
pub const ENV_SECRETS_MANAGER_ENDPOINT: &str = "AWS_SECRETS_MANAGER_ENDPOINT";

/// Environment variable overriding the cache lifetime, in seconds
pub const ENV_CACHE_TTL_SECS: &str = "SECRET_CACHE_TTL_SECS";
