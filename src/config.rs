//! # Handler Configuration
//!
//! Configuration loaded from environment variables.
//!
//! All settings have sensible defaults and can be overridden via environment variables.

use crate::constants::{
    DEFAULT_AWS_REGION, DEFAULT_CACHE_TTL_SECS, ENV_AWS_REGION, ENV_CACHE_TTL_SECS,
    ENV_SECRETS_MANAGER_ENDPOINT,
};
use std::time::Duration;

/// Secret handler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// AWS region for Secrets Manager (e.g., "us-east-1", "eu-west-1")
    pub region: String,
    /// Optional endpoint override for Secrets Manager requests
    pub endpoint_url: Option<String>,
    /// How long a fetched value stays in the cache
    pub cache_ttl: Duration,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_AWS_REGION.to_string(),
            endpoint_url: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl HandlerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            region: get(ENV_AWS_REGION).unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            endpoint_url: get(ENV_SECRETS_MANAGER_ENDPOINT),
            cache_ttl: Duration::from_secs(parse_or_default(
                get(ENV_CACHE_TTL_SECS),
                DEFAULT_CACHE_TTL_SECS,
            )),
        }
    }

    /// Override the region (CLI flags take precedence over the environment)
    #[must_use]
    pub fn with_region(mut self, region: Option<String>) -> Self {
        if let Some(region) = region {
            self.region = region;
        }
        self
    }

    /// Override the endpoint URL
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: Option<String>) -> Self {
        if endpoint_url.is_some() {
            self.endpoint_url = endpoint_url;
        }
        self
    }
}

/// Parse a value or fall back to the default
fn parse_or_default<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = HandlerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, HandlerConfig::default());
        assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_values_read_from_environment() {
        let config = HandlerConfig::from_lookup(lookup_from(&[
            ("AWS_REGION", "eu-west-1"),
            ("AWS_SECRETS_MANAGER_ENDPOINT", "http://localhost:4566"),
            ("SECRET_CACHE_TTL_SECS", "60"),
        ]));

        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_ttl_falls_back_to_default() {
        let config =
            HandlerConfig::from_lookup(lookup_from(&[("SECRET_CACHE_TTL_SECS", "one day")]));
        assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = HandlerConfig::from_lookup(lookup_from(&[
            ("AWS_REGION", "  "),
            ("AWS_SECRETS_MANAGER_ENDPOINT", ""),
        ]));
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint_url.is_none());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = HandlerConfig::default()
            .with_region(Some("ap-southeast-2".to_string()))
            .with_endpoint_url(None);
        assert_eq!(config.region, "ap-southeast-2");
        assert!(config.endpoint_url.is_none());
    }
}
