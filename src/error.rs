//! # Error Types
//!
//! Every failure inside a handler operation is an [`OperationFailure`]. At the
//! operation boundary it is wrapped into a [`SecretsManagerError`], which keeps the
//! original failure reachable through [`std::error::Error::source`].

use std::sync::Arc;
use thiserror::Error;

/// Error raised by a [`SecretStore`](crate::provider::SecretStore) implementation
///
/// Opaque to the handler: it only records which operation failed and why.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    pub operation: &'static str,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl StoreError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }
}

/// A failure inside `get_value` / `update_value`, before wrapping
#[derive(Debug, Error)]
pub enum OperationFailure {
    /// `update_value` was called with an absent, empty, or unstructured value
    #[error("{0}")]
    Validation(String),

    /// The `SecretString` payload is not valid JSON
    #[error("{0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The `SecretBinary` payload is not valid base64
    #[error("{0}")]
    InvalidBase64(#[source] base64::DecodeError),

    /// The decoded `SecretBinary` payload is not UTF-8
    #[error("{0}")]
    InvalidUtf8(#[source] std::string::FromUtf8Error),

    /// The record has neither `SecretString` nor `SecretBinary`
    #[error("secret value record carries no SecretString or SecretBinary payload")]
    MissingPayload,

    /// The new value could not be serialized to JSON
    #[error("{0}")]
    Serialization(#[source] serde_json::Error),

    /// The remote store failed. Shared between every caller attached to the same
    /// in-flight request.
    #[error("{0}")]
    Remote(#[source] Arc<StoreError>),
}

impl OperationFailure {
    pub fn reason(&self) -> FailureReason {
        match self {
            OperationFailure::Validation(_) => FailureReason::Validation,
            OperationFailure::InvalidJson(_)
            | OperationFailure::InvalidBase64(_)
            | OperationFailure::InvalidUtf8(_)
            | OperationFailure::MissingPayload => FailureReason::Decode,
            OperationFailure::Serialization(_) => FailureReason::Serialization,
            OperationFailure::Remote(_) => FailureReason::Remote,
        }
    }
}

/// Classification of operation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Input rejected before any remote call
    Validation,
    /// Stored payload could not be decoded
    Decode,
    /// New value could not be encoded
    Serialization,
    /// Remote store call failed
    Remote,
}

impl FailureReason {
    /// Get human-readable reason string for metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Validation => "validation",
            FailureReason::Decode => "decode",
            FailureReason::Serialization => "serialization",
            FailureReason::Remote => "remote",
        }
    }
}

/// The single error kind returned by handler operations
///
/// Carries the original failure's message. The failure itself is the error's
/// `source()` and is also available through [`SecretsManagerError::previous`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SecretsManagerError {
    message: String,
    #[source]
    previous: OperationFailure,
}

impl SecretsManagerError {
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The originating failure
    pub fn previous(&self) -> &OperationFailure {
        &self.previous
    }

    pub fn reason(&self) -> FailureReason {
        self.previous.reason()
    }

    /// The store error, when the failure came from the remote store
    pub fn store_error(&self) -> Option<&StoreError> {
        match &self.previous {
            OperationFailure::Remote(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.reason() == FailureReason::Validation
    }
}

impl From<OperationFailure> for SecretsManagerError {
    fn from(previous: OperationFailure) -> Self {
        Self {
            message: previous.to_string(),
            previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_wrapped_error_keeps_original_message() {
        let err = SecretsManagerError::from(OperationFailure::Remote(Arc::new(StoreError::new(
            "GetSecretValue",
            "Failed to fetch secret",
        ))));

        assert_eq!(err.to_string(), "Failed to fetch secret");
        assert_eq!(err.message(), "Failed to fetch secret");
        assert_eq!(err.reason(), FailureReason::Remote);
        assert_eq!(
            err.store_error().map(|e| e.operation),
            Some("GetSecretValue")
        );
    }

    #[test]
    fn test_source_chain_reaches_store_error() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "connection timed out");
        let store = StoreError::new("PutSecretValue", "dispatch failure").with_source(io);
        let err = SecretsManagerError::from(OperationFailure::Remote(Arc::new(store)));

        let previous = err.source().expect("wrapped error has a source");
        assert_eq!(previous.to_string(), "dispatch failure");
        let root = previous
            .source()
            .and_then(|cause| cause.source())
            .expect("store error keeps its cause");
        assert_eq!(root.to_string(), "connection timed out");
    }

    #[test]
    fn test_failure_reasons() {
        let json_err = serde_json::from_str::<serde_json::Value>("{\"foo\":INVALID}")
            .expect_err("invalid JSON");
        let err = SecretsManagerError::from(OperationFailure::InvalidJson(json_err));
        assert_eq!(err.reason(), FailureReason::Decode);
        assert!(err.store_error().is_none());

        let err = SecretsManagerError::from(OperationFailure::Validation(
            "secret value must not be empty".to_string(),
        ));
        assert!(err.is_validation());
        assert_eq!(err.reason().as_str(), "validation");

        assert_eq!(OperationFailure::MissingPayload.reason(), FailureReason::Decode);
    }
}
