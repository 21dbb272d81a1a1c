//! # Metrics Registry
//!
//! Prometheus metrics registry setup and registration.

use anyhow::Result;
use prometheus::core::Collector;
use prometheus::{Registry, TextEncoder};
use std::sync::LazyLock;

/// Global Prometheus metrics registry
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Register all metrics with the Prometheus registry
///
/// Safe to call more than once; metrics that are already registered are skipped.
///
/// # Errors
///
/// Returns an error if the registry rejects a collector for any reason other
/// than it already being registered.
pub fn register_metrics() -> Result<()> {
    super::handler_metrics::register_handler_metrics()?;
    Ok(())
}

/// Render every registered metric in the Prometheus text exposition format
///
/// # Errors
///
/// Returns an error if the gathered metrics cannot be encoded.
pub fn gather_metrics() -> Result<String> {
    Ok(TextEncoder::new().encode_to_string(&REGISTRY.gather())?)
}

/// Register a single collector, ignoring duplicates
pub(crate) fn register(collector: Box<dyn Collector>) -> Result<()> {
    match REGISTRY.register(collector) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
