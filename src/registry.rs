//! # Secrets Manager Registry
//!
//! Hands out one [`SecretHandler`] per secret name.
//!
//! Lifecycle: a handler is created on the first request for its name and lives
//! as long as the registry; handlers are never evicted. [`SecretsManager::shared`]
//! provides a single process-wide registry configured from the environment.

use crate::config::HandlerConfig;
use crate::handler::SecretHandler;
use crate::observability::metrics;
use crate::provider::{AwsSecretsManager, SecretStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

static SHARED: OnceCell<SecretsManager> = OnceCell::const_new();

/// Registry of secret handlers sharing one secret store
pub struct SecretsManager {
    store: Arc<dyn SecretStore>,
    cache_ttl: Duration,
    handlers: Mutex<HashMap<String, Arc<SecretHandler>>>,
}

impl std::fmt::Debug for SecretsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsManager")
            .field("store", &self.store)
            .field("cache_ttl", &self.cache_ttl)
            .field("handlers", &self.len())
            .finish()
    }
}

impl SecretsManager {
    /// Registry over `store` with the default cache lifetime
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self::with_cache_ttl(
            store,
            Duration::from_secs(crate::constants::DEFAULT_CACHE_TTL_SECS),
        )
    }

    pub fn with_cache_ttl(store: Arc<dyn SecretStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache_ttl,
            handlers: Mutex::new(HashMap::new()),
        }
    }

    /// Registry backed by AWS Secrets Manager
    ///
    /// Also registers the handler metrics so
    /// [`gather_metrics`](crate::observability::metrics::gather_metrics) exports them.
    pub async fn from_config(config: &HandlerConfig) -> Self {
        if let Err(e) = metrics::register_metrics() {
            warn!("Failed to register secret handler metrics: {e}");
        }

        info!(
            "Creating AWS Secrets Manager registry (region={}, cache_ttl={}s)",
            config.region,
            config.cache_ttl.as_secs()
        );
        let store = AwsSecretsManager::new(config).await;
        Self::with_cache_ttl(Arc::new(store), config.cache_ttl)
    }

    /// Process-wide registry, built from [`HandlerConfig::from_env`] on first use
    pub async fn shared() -> &'static SecretsManager {
        SHARED
            .get_or_init(|| async { Self::from_config(&HandlerConfig::from_env()).await })
            .await
    }

    /// Handler for `secret_name`, created on first request
    pub fn secret(&self, secret_name: &str) -> Arc<SecretHandler> {
        let mut handlers = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let handler = handlers.entry(secret_name.to_string()).or_insert_with(|| {
            debug!(secret.name = %secret_name, "Creating secret handler");
            Arc::new(SecretHandler::with_cache_ttl(
                secret_name,
                Arc::clone(&self.store),
                self.cache_ttl,
            ))
        });

        Arc::clone(handler)
    }

    /// Number of handlers created so far
    pub fn len(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
