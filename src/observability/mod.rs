//! # Observability
//!
//! Tracing subscriber setup and Prometheus metrics.

pub mod metrics;

use crate::constants::DEFAULT_LOG_FILTER;

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG`, falling back to `default_filter` (or the crate default).
/// Returns quietly if a subscriber is already installed.
pub fn init_tracing(default_filter: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.unwrap_or(DEFAULT_LOG_FILTER).into());

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        tracing::debug!("Tracing subscriber already initialized: {}", e);
    }
}
