//! # Secret Handler
//!
//! Cached, deduplicated access to one secret.
//!
//! Every remote call is wrapped in a [`Shared`] future and published into the
//! handler's [`SecretValueCache`] before anyone awaits it. The cache lookup and
//! the publish happen under the same lock, so for a given (version id, version
//! stage) at most one remote fetch is in flight and every concurrent caller
//! observes that fetch's outcome.
//!
//! A handle that resolves to an error is evicted by the first caller to observe
//! the failure, unless the slot has already been replaced, so the next read
//! retries instead of replaying the failure until expiry.

use crate::cache::SecretValueCache;
use crate::error::{OperationFailure, SecretsManagerError, StoreError};
use crate::observability::metrics;
use crate::provider::{
    GetSecretValueRequest, PutSecretValueRequest, SecretPayload, SecretStore, SecretValue,
    SecretValueRecord, UpdateConfirmation, VersionCoordinate,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of a remote call, cloneable so every waiter gets a copy
type SharedResult<T> = Result<Arc<T>, Arc<StoreError>>;

/// Handle to an in-progress-or-complete remote operation
type PendingRecord = Shared<BoxFuture<'static, SharedResult<SecretValueRecord>>>;

const GET_VALUE: &str = "get_value";
const UPDATE_VALUE: &str = "update_value";

/// Reads and writes one secret through a per-handler cache
///
/// Obtained from [`SecretsManager::secret`](crate::SecretsManager::secret); one
/// instance exists per secret name.
pub struct SecretHandler {
    secret_name: String,
    coordinate: Mutex<VersionCoordinate>,
    cache: Mutex<SecretValueCache<PendingRecord>>,
    store: Arc<dyn SecretStore>,
}

impl std::fmt::Debug for SecretHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretHandler")
            .field("secret_name", &self.secret_name)
            .field("coordinate", &self.version_coordinate())
            .finish_non_exhaustive()
    }
}

impl SecretHandler {
    pub fn new(secret_name: impl Into<String>, store: Arc<dyn SecretStore>) -> Self {
        Self::with_cache_ttl(
            secret_name,
            store,
            Duration::from_secs(crate::constants::DEFAULT_CACHE_TTL_SECS),
        )
    }

    pub fn with_cache_ttl(
        secret_name: impl Into<String>,
        store: Arc<dyn SecretStore>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            secret_name: secret_name.into(),
            coordinate: Mutex::new(VersionCoordinate::default()),
            cache: Mutex::new(SecretValueCache::with_ttl(cache_ttl)),
            store,
        }
    }

    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }

    /// Snapshot of the current version id and stage
    pub fn version_coordinate(&self) -> VersionCoordinate {
        lock(&self.coordinate).clone()
    }

    /// Set the version id used by subsequent operations. Empty means "current".
    pub fn set_version_id(&self, version_id: impl Into<String>) -> &Self {
        lock(&self.coordinate).version_id = version_id.into();
        self
    }

    /// Set the version stage used by subsequent operations. Empty means "current".
    pub fn set_version_stage(&self, version_stage: impl Into<String>) -> &Self {
        lock(&self.coordinate).version_stage = version_stage.into();
        self
    }

    /// Drop the cached value for the current version id and stage
    pub fn clear_from_cache(&self) -> &Self {
        let coordinate = self.version_coordinate();
        lock(&self.cache).clear(&coordinate.version_id, &coordinate.version_stage);
        debug!(
            secret.name = %self.secret_name,
            version.id = %coordinate.version_id,
            version.stage = %coordinate.version_stage,
            "Cleared cached secret value"
        );
        self
    }

    /// Get the decoded secret value
    ///
    /// JSON for `SecretString` secrets, UTF-8 text for `SecretBinary` secrets.
    /// The version id and stage are captured when this is called, not when the
    /// returned future is first polled.
    pub fn get_value(
        &self,
    ) -> impl Future<Output = Result<SecretValue, SecretsManagerError>> + Send + '_ {
        let coordinate = self.version_coordinate();

        async move {
            let result = async {
                let record = self.fetch_record(&coordinate).await?;
                parse_value_secret(&record)
            }
            .await;

            self.finish(GET_VALUE, result)
        }
    }

    /// Get the full secret value record as returned by the store
    pub fn get_value_data(
        &self,
    ) -> impl Future<Output = Result<Arc<SecretValueRecord>, SecretsManagerError>> + Send + '_ {
        let coordinate = self.version_coordinate();

        async move {
            let result = self.fetch_record(&coordinate).await;
            self.finish(GET_VALUE, result)
        }
    }

    /// Replace the secret value, keeping its current string/binary encoding
    ///
    /// `new_secret` must serialize to a non-empty JSON object or array. It is
    /// validated and serialized, and the version id and stage captured, when
    /// this is called. The store's confirmation is returned unchanged.
    pub fn update_value<'a, T>(
        &'a self,
        new_secret: &T,
    ) -> impl Future<Output = Result<UpdateConfirmation, SecretsManagerError>> + Send + 'a
    where
        T: Serialize + ?Sized,
    {
        let coordinate = self.version_coordinate();
        let serialized = validate_new_secret(new_secret).and_then(|()| {
            serde_json::to_string(new_secret).map_err(OperationFailure::Serialization)
        });

        async move {
            let result = async {
                let serialized = serialized?;
                let current = self.fetch_record(&coordinate).await?;
                let payload = SecretPayload::matching(&current, serialized);

                self.put_record(&coordinate, payload).await
            }
            .await;

            self.finish(UPDATE_VALUE, result)
        }
    }

    /// Fetch the record for `coordinate`, attaching to any cached or in-flight fetch
    async fn fetch_record(
        &self,
        coordinate: &VersionCoordinate,
    ) -> Result<Arc<SecretValueRecord>, OperationFailure> {
        let pending = {
            let mut cache = lock(&self.cache);

            if let Some(pending) = cache.get(&coordinate.version_id, &coordinate.version_stage) {
                metrics::increment_cache_hits();
                debug!(secret.name = %self.secret_name, "Secret value served from cache");
                pending
            } else {
                metrics::increment_cache_misses();
                metrics::increment_remote_calls("get_secret_value");
                debug!(
                    secret.name = %self.secret_name,
                    version.id = %coordinate.version_id,
                    version.stage = %coordinate.version_stage,
                    "Fetching secret value from store"
                );

                let store = Arc::clone(&self.store);
                let request = GetSecretValueRequest::new(&self.secret_name, coordinate);
                let pending = async move {
                    store
                        .get_secret_value(request)
                        .await
                        .map(Arc::new)
                        .map_err(Arc::new)
                }
                .boxed()
                .shared();

                cache.set(
                    &coordinate.version_id,
                    &coordinate.version_stage,
                    pending.clone(),
                );
                pending
            }
        };

        self.settle(coordinate, pending).await
    }

    /// Issue the update and publish the record it produces under `coordinate`
    async fn put_record(
        &self,
        coordinate: &VersionCoordinate,
        payload: SecretPayload,
    ) -> Result<UpdateConfirmation, OperationFailure> {
        metrics::increment_remote_calls("put_secret_value");

        let store = Arc::clone(&self.store);
        let request = PutSecretValueRequest::new(&self.secret_name, payload.clone(), coordinate);
        let update = async move {
            store
                .put_secret_value(request)
                .await
                .map(Arc::new)
                .map_err(Arc::new)
        }
        .boxed()
        .shared();

        // Readers arriving while the update is in flight wait for it and then see
        // the new value instead of the stale one.
        let secret_name = self.secret_name.clone();
        let next_record: PendingRecord = update
            .clone()
            .map(move |result| {
                result.map(|confirmation| {
                    Arc::new(SecretValueRecord::after_update(
                        &secret_name,
                        &payload,
                        &confirmation,
                    ))
                })
            })
            .boxed()
            .shared();

        lock(&self.cache).set(
            &coordinate.version_id,
            &coordinate.version_stage,
            next_record.clone(),
        );

        match update.await {
            Ok(confirmation) => {
                info!(
                    secret.name = %self.secret_name,
                    version.id = confirmation.version_id.as_deref().unwrap_or_default(),
                    "Secret value updated"
                );
                Ok(confirmation.as_ref().clone())
            }
            Err(e) => {
                self.evict(coordinate, &next_record);
                Err(OperationFailure::Remote(e))
            }
        }
    }

    /// Await a cached handle, evicting it if it failed
    async fn settle(
        &self,
        coordinate: &VersionCoordinate,
        pending: PendingRecord,
    ) -> Result<Arc<SecretValueRecord>, OperationFailure> {
        match pending.clone().await {
            Ok(record) => Ok(record),
            Err(e) => {
                self.evict(coordinate, &pending);
                Err(OperationFailure::Remote(e))
            }
        }
    }

    /// Clear `coordinate` if it still holds `failed`
    fn evict(&self, coordinate: &VersionCoordinate, failed: &PendingRecord) {
        let evicted = lock(&self.cache).clear_if(
            &coordinate.version_id,
            &coordinate.version_stage,
            |cached| Shared::ptr_eq(cached, failed),
        );

        if evicted {
            metrics::increment_cache_evictions();
            warn!(
                secret.name = %self.secret_name,
                version.id = %coordinate.version_id,
                version.stage = %coordinate.version_stage,
                "Evicted failed secret value request from cache"
            );
        }
    }

    /// Wrap failures at the operation boundary
    fn finish<T>(
        &self,
        operation: &'static str,
        result: Result<T, OperationFailure>,
    ) -> Result<T, SecretsManagerError> {
        result.map_err(|failure| {
            metrics::increment_operation_failures(operation, failure.reason());
            warn!(
                secret.name = %self.secret_name,
                operation,
                reason = failure.reason().as_str(),
                "Secret operation failed: {}",
                failure
            );
            SecretsManagerError::from(failure)
        })
    }
}

/// Decode a record's payload
///
/// `SecretString` is parsed as JSON and takes precedence. Otherwise
/// `SecretBinary` is base64-decoded and returned as UTF-8 text.
pub fn parse_value_secret(record: &SecretValueRecord) -> Result<SecretValue, OperationFailure> {
    if let Some(text) = &record.secret_string {
        return serde_json::from_str(text)
            .map(SecretValue::Json)
            .map_err(OperationFailure::InvalidJson);
    }

    let encoded = record
        .secret_binary
        .as_ref()
        .ok_or(OperationFailure::MissingPayload)?;
    let bytes = BASE64
        .decode(encoded)
        .map_err(OperationFailure::InvalidBase64)?;

    String::from_utf8(bytes)
        .map(SecretValue::Text)
        .map_err(OperationFailure::InvalidUtf8)
}

/// Accept only non-empty JSON objects and arrays
fn validate_new_secret<T>(new_secret: &T) -> Result<(), OperationFailure>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(new_secret).map_err(OperationFailure::Serialization)?;

    let is_empty = match &value {
        serde_json::Value::Null => {
            return Err(OperationFailure::Validation(
                "A new secret value is required".to_string(),
            ))
        }
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => {
            return Err(OperationFailure::Validation(
                "The new secret value must be a JSON object or array".to_string(),
            ))
        }
    };

    if is_empty {
        return Err(OperationFailure::Validation(
            "The new secret value must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
