//! # Registry Tests
//!
//! These tests verify:
//! - One handler per secret name
//! - Handlers share the registry's store but keep separate caches and coordinates
//! - Registries built from configuration export handler metrics

mod common;

use aws_secret_handler::provider::{SecretStore, SecretValueRecord};
use aws_secret_handler::observability::metrics::gather_metrics;
use aws_secret_handler::{HandlerConfig, SecretValue, SecretsManager};
use common::MockSecretStore;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn manager_for(store: &Arc<MockSecretStore>) -> SecretsManager {
    SecretsManager::new(Arc::clone(store) as Arc<dyn SecretStore>)
}

#[test]
fn test_same_name_returns_same_handler() {
    let manager = manager_for(&MockSecretStore::new());
    assert!(manager.is_empty());

    let first = manager.secret("my-secret");
    let second = manager.secret("my-secret");
    let other = manager.secret("other-secret");

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(first.secret_name(), "my-secret");
    assert_eq!(other.secret_name(), "other-secret");
    assert_eq!(manager.len(), 2);
}

#[test]
fn test_coordinate_survives_lookup() {
    let manager = manager_for(&MockSecretStore::new());

    manager.secret("my-secret").set_version_stage("AWSPREVIOUS");

    assert_eq!(
        manager.secret("my-secret").version_coordinate().version_stage,
        "AWSPREVIOUS"
    );
    assert_eq!(
        manager.secret("other-secret").version_coordinate().version_stage,
        ""
    );
}

#[tokio::test]
async fn test_handlers_cache_independently() {
    let store = MockSecretStore::returning(SecretValueRecord::from_string(r#"{"foo":"bar"}"#));
    let manager = manager_for(&store);

    manager.secret("first").get_value().await.expect("first");
    manager.secret("first").get_value().await.expect("first cached");
    let second = manager.secret("second").get_value().await.expect("second");

    assert_eq!(second, SecretValue::Json(json!({ "foo": "bar" })));
    let names: Vec<_> = store
        .get_calls()
        .into_iter()
        .map(|call| call.secret_id)
        .collect();
    assert_eq!(names, vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_registry_cache_ttl_applies_to_handlers() {
    let store = MockSecretStore::returning(SecretValueRecord::from_string("[1]"));
    let manager = SecretsManager::with_cache_ttl(
        Arc::clone(&store) as Arc<dyn SecretStore>,
        Duration::from_secs(5),
    );
    let handler = manager.secret("short-lived");

    handler.get_value().await.expect("initial");
    tokio::time::advance(Duration::from_secs(4)).await;
    handler.get_value().await.expect("cached");
    tokio::time::advance(Duration::from_secs(2)).await;
    handler.get_value().await.expect("refetched");

    assert_eq!(store.get_call_count(), 2);
}

#[tokio::test]
async fn test_configured_registry_exports_metrics() {
    let config = HandlerConfig::default()
        .with_region(Some("eu-west-1".to_string()))
        .with_endpoint_url(Some("http://localhost:4566".to_string()));

    let manager = SecretsManager::from_config(&config).await;
    assert!(manager.is_empty());

    let rendered = gather_metrics().expect("metrics render");
    assert!(rendered.contains("secret_handler_cache_hits_total"));
    assert!(rendered.contains("secret_handler_cache_misses_total"));
}
