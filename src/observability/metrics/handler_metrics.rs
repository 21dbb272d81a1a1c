//! # Handler Metrics
//!
//! Metrics for secret handler operations: cache lookups, remote store calls, failures.

use crate::error::FailureReason;
use crate::observability::metrics::registry::register;
use anyhow::Result;
use prometheus::{IntCounter, IntCounterVec};
use std::sync::LazyLock;

// Cache metrics
static CACHE_HITS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_handler_cache_hits_total",
        "Total number of reads served by a cached or in-flight value",
    )
    .expect("Failed to create CACHE_HITS_TOTAL metric - this should never happen")
});

static CACHE_MISSES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_handler_cache_misses_total",
        "Total number of reads that started a remote fetch",
    )
    .expect("Failed to create CACHE_MISSES_TOTAL metric - this should never happen")
});

static CACHE_EVICTIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_handler_cache_evictions_total",
        "Total number of failed in-flight values evicted from the cache",
    )
    .expect("Failed to create CACHE_EVICTIONS_TOTAL metric - this should never happen")
});

// Remote store metrics
static REMOTE_CALLS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_handler_remote_calls_total",
            "Total number of calls issued to the remote secret store",
        ),
        &["operation"],
    )
    .expect("Failed to create REMOTE_CALLS_TOTAL metric - this should never happen")
});

static OPERATION_FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_handler_operation_failures_total",
            "Total number of failed get/update operations",
        ),
        &["operation", "reason"],
    )
    .expect("Failed to create OPERATION_FAILURES_TOTAL metric - this should never happen")
});

/// Register handler metrics with the registry
pub(crate) fn register_handler_metrics() -> Result<()> {
    register(Box::new(CACHE_HITS_TOTAL.clone()))?;
    register(Box::new(CACHE_MISSES_TOTAL.clone()))?;
    register(Box::new(CACHE_EVICTIONS_TOTAL.clone()))?;
    register(Box::new(REMOTE_CALLS_TOTAL.clone()))?;
    register(Box::new(OPERATION_FAILURES_TOTAL.clone()))?;
    Ok(())
}

pub fn increment_cache_hits() {
    CACHE_HITS_TOTAL.inc();
}

pub fn increment_cache_misses() {
    CACHE_MISSES_TOTAL.inc();
}

pub fn increment_cache_evictions() {
    CACHE_EVICTIONS_TOTAL.inc();
}

pub fn increment_remote_calls(operation: &str) {
    REMOTE_CALLS_TOTAL.with_label_values(&[operation]).inc();
}

pub fn increment_operation_failures(operation: &str, reason: FailureReason) {
    OPERATION_FAILURES_TOTAL
        .with_label_values(&[operation, reason.as_str()])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::{gather_metrics, register_metrics};

    #[test]
    fn test_registered_metrics_are_exported() {
        register_metrics().expect("first registration");
        register_metrics().expect("repeated registration is ignored");

        increment_cache_hits();
        increment_remote_calls("get_secret_value");
        increment_operation_failures("update_value", FailureReason::Validation);

        let text = gather_metrics().expect("metrics render");
        assert!(text.contains("secret_handler_cache_hits_total"));
        assert!(text.contains("operation=\"get_secret_value\""));
        assert!(text.contains("reason=\"validation\""));
    }
}
