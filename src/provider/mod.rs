//! # Secret Store Providers
//!
//! The remote secret store the handler talks to.
//!
//! - `aws`: AWS Secrets Manager, via the official AWS Rust SDK
//! - `types`: request and record shapes shared by every store

pub mod aws;
pub mod types;

pub use aws::AwsSecretsManager;
pub use types::*;

use crate::error::StoreError;
use async_trait::async_trait;

/// Remote secret store
///
/// Failures are opaque to the handler; implementations decide what goes into
/// the [`StoreError`].
#[async_trait]
pub trait SecretStore: Send + Sync + std::fmt::Debug {
    /// Fetch a secret value (`GetSecretValue`)
    async fn get_secret_value(
        &self,
        request: GetSecretValueRequest,
    ) -> Result<SecretValueRecord, StoreError>;

    /// Write a new secret value (`PutSecretValue`)
    async fn put_secret_value(
        &self,
        request: PutSecretValueRequest,
    ) -> Result<UpdateConfirmation, StoreError>;
}
