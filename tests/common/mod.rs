//! In-memory secret store used by the integration tests
//!
//! Records every request, returns configurable responses per
//! (version id, version stage), and can delay responses to widen race windows.

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers")]

use async_trait::async_trait;
use aws_secret_handler::error::StoreError;
use aws_secret_handler::provider::{
    GetSecretValueRequest, PutSecretValueRequest, SecretStore, SecretValueRecord,
    UpdateConfirmation,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Key = (Option<String>, Option<String>);

#[derive(Debug, Default)]
pub struct MockSecretStore {
    responses: Mutex<HashMap<Key, Result<SecretValueRecord, String>>>,
    put_failure: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    get_calls: Mutex<Vec<GetSecretValueRequest>>,
    put_calls: Mutex<Vec<PutSecretValueRequest>>,
}

impl MockSecretStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store answering every unversioned read with `record`
    pub fn returning(record: SecretValueRecord) -> Arc<Self> {
        let store = Self::new();
        store.respond(None, None, Ok(record));
        store
    }

    /// Set the response for one (version id, version stage) pair
    pub fn respond(
        &self,
        version_id: Option<&str>,
        version_stage: Option<&str>,
        response: Result<SecretValueRecord, &str>,
    ) {
        self.responses.lock().unwrap().insert(
            (
                version_id.map(str::to_string),
                version_stage.map(str::to_string),
            ),
            response.map_err(str::to_string),
        );
    }

    pub fn fail_puts(&self, message: &str) {
        *self.put_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn get_calls(&self) -> Vec<GetSecretValueRequest> {
        self.get_calls.lock().unwrap().clone()
    }

    pub fn get_call_count(&self) -> usize {
        self.get_calls.lock().unwrap().len()
    }

    pub fn put_calls(&self) -> Vec<PutSecretValueRequest> {
        self.put_calls.lock().unwrap().clone()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SecretStore for MockSecretStore {
    async fn get_secret_value(
        &self,
        request: GetSecretValueRequest,
    ) -> Result<SecretValueRecord, StoreError> {
        self.get_calls.lock().unwrap().push(request.clone());
        self.pause().await;

        let key = (request.version_id.clone(), request.version_stage.clone());
        let response = self.responses.lock().unwrap().get(&key).cloned();

        match response {
            Some(Ok(mut record)) => {
                record.name.get_or_insert(request.secret_id);
                Ok(record)
            }
            Some(Err(message)) => Err(StoreError::new("GetSecretValue", message)),
            None => Err(StoreError::new(
                "GetSecretValue",
                "Secrets Manager can't find the specified secret.",
            )),
        }
    }

    async fn put_secret_value(
        &self,
        request: PutSecretValueRequest,
    ) -> Result<UpdateConfirmation, StoreError> {
        let call_number = {
            let mut calls = self.put_calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };
        self.pause().await;

        let failure = self.put_failure.lock().unwrap().clone();
        if let Some(message) = failure {
            return Err(StoreError::new("PutSecretValue", message));
        }

        Ok(UpdateConfirmation {
            arn: Some(format!(
                "arn:aws:secretsmanager:us-east-1:123456789012:secret:{}",
                request.secret_id
            )),
            name: Some(request.secret_id),
            version_id: Some(
                request
                    .version_id
                    .unwrap_or_else(|| format!("generated-version-{call_number}")),
            ),
            version_stages: vec![request
                .version_stage
                .unwrap_or_else(|| "AWSCURRENT".to_string())],
        })
    }
}
