//! # AWS Secrets Manager Client
//!
//! [`SecretStore`] implementation backed by the AWS Secrets Manager API.
//!
//! - `GetSecretValue` for reads
//! - `PutSecretValue` for writes; the handler's version id becomes the
//!   `ClientRequestToken` (the id of the new version) and its version stage is
//!   attached through `VersionStages`
//!
//! An update with a version id set creates that version; it cannot overwrite an
//! existing one. Reusing the id of a stored version with different content
//! fails with `ResourceExistsException`, and AWS requires the id to be 32 to 64
//! characters. Leave the version id empty to let AWS generate one.

mod auth;

use crate::config::HandlerConfig;
use crate::error::StoreError;
use crate::provider::{
    GetSecretValueRequest, PutSecretValueRequest, SecretPayload, SecretStore, SecretValueRecord,
    UpdateConfirmation,
};
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::primitives::{Blob, DateTime as AwsDateTime};
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use tracing::debug;

use self::auth::create_sdk_config;

const GET_SECRET_VALUE: &str = "GetSecretValue";
const PUT_SECRET_VALUE: &str = "PutSecretValue";

/// AWS Secrets Manager provider implementation
pub struct AwsSecretsManager {
    pub(crate) client: SecretsManagerClient,
    region: String,
}

impl std::fmt::Debug for AwsSecretsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretsManager")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsSecretsManager {
    /// Create a new AWS Secrets Manager client from handler configuration
    pub async fn new(config: &HandlerConfig) -> Self {
        let sdk_config = create_sdk_config(config).await;
        Self::from_client(SecretsManagerClient::new(&sdk_config), config.region.clone())
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: SecretsManagerClient, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl SecretStore for AwsSecretsManager {
    async fn get_secret_value(
        &self,
        request: GetSecretValueRequest,
    ) -> Result<SecretValueRecord, StoreError> {
        debug!(secret.name = %request.secret_id, "Calling {}", GET_SECRET_VALUE);

        let output = self
            .client
            .get_secret_value()
            .secret_id(request.secret_id)
            .set_version_id(request.version_id)
            .set_version_stage(request.version_stage)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                StoreError::new(GET_SECRET_VALUE, message).with_source(e)
            })?;

        Ok(SecretValueRecord {
            arn: output.arn().map(str::to_string),
            name: output.name().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
            secret_string: output.secret_string().map(str::to_string),
            secret_binary: output.secret_binary().map(|blob| BASE64.encode(blob)),
            version_stages: output.version_stages().to_vec(),
            created_date: output.created_date().and_then(to_chrono),
        })
    }

    async fn put_secret_value(
        &self,
        request: PutSecretValueRequest,
    ) -> Result<UpdateConfirmation, StoreError> {
        debug!(secret.name = %request.secret_id, "Calling {}", PUT_SECRET_VALUE);

        let (secret_string, secret_binary) = match request.payload {
            SecretPayload::String(text) => (Some(text), None),
            SecretPayload::Binary(encoded) => {
                let bytes = BASE64.decode(encoded).map_err(|e| {
                    StoreError::new(PUT_SECRET_VALUE, format!("Invalid SecretBinary payload: {e}"))
                        .with_source(e)
                })?;
                (None, Some(Blob::new(bytes)))
            }
        };

        let output = self
            .client
            .put_secret_value()
            .secret_id(request.secret_id)
            .set_secret_string(secret_string)
            .set_secret_binary(secret_binary)
            .set_client_request_token(request.version_id)
            .set_version_stages(request.version_stage.map(|stage| vec![stage]))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                StoreError::new(PUT_SECRET_VALUE, message).with_source(e)
            })?;

        Ok(UpdateConfirmation {
            arn: output.arn().map(str::to_string),
            name: output.name().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
            version_stages: output.version_stages().to_vec(),
        })
    }
}

fn to_chrono(date: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(date.secs(), date.subsec_nanos())
}
