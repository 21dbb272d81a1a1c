//! # Metrics Module
//!
//! Prometheus metrics for the secret handlers.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration and text rendering
//! - `handler_metrics` - Cache hits/misses, remote calls, failures and evictions

pub mod handler_metrics;
pub mod registry;

pub use handler_metrics::*;
pub use registry::*;
