//! # Secret Store Types
//!
//! Request and response shapes exchanged with the remote secret store.
//!
//! Records serialize with the AWS field names (`SecretString`, `SecretBinary`,
//! `VersionId`, ...) so `--full` CLI output matches what the AWS CLI prints.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The (version id, version stage) pair a handler reads and writes
///
/// Empty strings mean "unspecified" and are left out of remote requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VersionCoordinate {
    pub version_id: String,
    pub version_stage: String,
}

impl VersionCoordinate {
    pub fn new(version_id: impl Into<String>, version_stage: impl Into<String>) -> Self {
        Self {
            version_id: version_id.into(),
            version_stage: version_stage.into(),
        }
    }

    /// Version id to send, if any
    pub fn version_id(&self) -> Option<&str> {
        non_empty(&self.version_id)
    }

    /// Version stage to send, if any
    pub fn version_stage(&self) -> Option<&str> {
        non_empty(&self.version_stage)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Secret value record as returned by `GetSecretValue`
///
/// Exactly one of `secret_string` / `secret_binary` is expected. `secret_binary`
/// holds the base64 text form of the bytes, as on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretValueRecord {
    #[serde(rename = "ARN", default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_binary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub version_stages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
}

impl SecretValueRecord {
    /// Record carrying a string payload
    pub fn from_string(secret_string: impl Into<String>) -> Self {
        Self {
            secret_string: Some(secret_string.into()),
            ..Self::default()
        }
    }

    /// Record carrying a binary payload, base64-encoded from raw bytes
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            secret_binary: Some(BASE64.encode(bytes)),
            ..Self::default()
        }
    }

    /// Whether the secret is stored in string form
    ///
    /// String form wins when both payloads are present.
    pub fn is_string_encoded(&self) -> bool {
        self.secret_string.is_some()
    }

    /// The record the store holds after a successful `PutSecretValue`
    pub fn after_update(
        secret_name: &str,
        payload: &SecretPayload,
        confirmation: &UpdateConfirmation,
    ) -> Self {
        let (secret_string, secret_binary) = match payload {
            SecretPayload::String(text) => (Some(text.clone()), None),
            SecretPayload::Binary(encoded) => (None, Some(encoded.clone())),
        };

        Self {
            arn: confirmation.arn.clone(),
            name: confirmation
                .name
                .clone()
                .or_else(|| Some(secret_name.to_string())),
            version_id: confirmation.version_id.clone(),
            secret_string,
            secret_binary,
            version_stages: confirmation.version_stages.clone(),
            created_date: Some(Utc::now()),
        }
    }
}

/// Decoded secret value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SecretValue {
    /// JSON parsed from `SecretString`
    Json(serde_json::Value),
    /// UTF-8 text decoded from `SecretBinary`
    Text(String),
}

impl SecretValue {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            SecretValue::Json(value) => Some(value),
            SecretValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SecretValue::Json(_) => None,
            SecretValue::Text(text) => Some(text),
        }
    }
}

/// Request for `GetSecretValue`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSecretValueRequest {
    pub secret_id: String,
    pub version_id: Option<String>,
    pub version_stage: Option<String>,
}

impl GetSecretValueRequest {
    pub fn new(secret_id: &str, coordinate: &VersionCoordinate) -> Self {
        Self {
            secret_id: secret_id.to_string(),
            version_id: coordinate.version_id().map(str::to_string),
            version_stage: coordinate.version_stage().map(str::to_string),
        }
    }
}

/// New payload for `PutSecretValue`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretPayload {
    /// Sent as `SecretString`
    String(String),
    /// Sent as `SecretBinary`; holds base64 text
    Binary(String),
}

impl SecretPayload {
    /// Encode `serialized` the same way `current` is stored
    pub fn matching(current: &SecretValueRecord, serialized: String) -> Self {
        if current.is_string_encoded() {
            SecretPayload::String(serialized)
        } else {
            SecretPayload::Binary(BASE64.encode(serialized))
        }
    }
}

/// Request for `PutSecretValue`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutSecretValueRequest {
    pub secret_id: String,
    pub payload: SecretPayload,
    pub version_id: Option<String>,
    pub version_stage: Option<String>,
}

impl PutSecretValueRequest {
    pub fn new(secret_id: &str, payload: SecretPayload, coordinate: &VersionCoordinate) -> Self {
        Self {
            secret_id: secret_id.to_string(),
            payload,
            version_id: coordinate.version_id().map(str::to_string),
            version_stage: coordinate.version_stage().map(str::to_string),
        }
    }
}

/// Store confirmation for `PutSecretValue`, returned to callers unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateConfirmation {
    #[serde(rename = "ARN", default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub version_stages: Vec<String>,
}
