//! AWS Secret Handler Library
//!
//! Memoized, concurrency-safe access to AWS Secrets Manager secret values.
//!
//! ```no_run
//! # async fn example() -> Result<(), aws_secret_handler::SecretsManagerError> {
//! use aws_secret_handler::SecretsManager;
//!
//! let manager = SecretsManager::shared().await;
//! let handler = manager.secret("my-secret");
//!
//! let value = handler.set_version_stage("AWSCURRENT").get_value().await?;
//! handler
//!     .update_value(&serde_json::json!({ "password": "rotated" }))
//!     .await?;
//! # let _ = value;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod handler;
pub mod observability;
pub mod provider;
pub mod registry;

pub use config::HandlerConfig;
pub use error::{FailureReason, OperationFailure, SecretsManagerError, StoreError};
pub use handler::{parse_value_secret, SecretHandler};
pub use provider::{SecretStore, SecretValue, SecretValueRecord, UpdateConfirmation};
pub use registry::SecretsManager;
