//! AWS Secrets Manager store.
//!
//! Uses AWS credentials from the environment or the default credential
//! provider chain. Inside Lambda these come from the execution role.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_secretsmanager::Client;
use tracing::trace;

use super::SecretStore;
use crate::error::{Result, SecretError};

const ACCESS_DENIED: &str = "AccessDeniedException";

/// Secrets Manager backed store.
#[derive(Debug, Clone)]
pub struct AwsSecretsManager {
    client: Client,
}

impl AwsSecretsManager {
    /// Load AWS config from the environment and build a client.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for AwsSecretsManager {
    async fn get_secret(&self, id: &str) -> Result<Option<String>> {
        trace!(id, "GetSecretValue");

        let output = match self.client.get_secret_value().secret_id(id).send().await {
            Ok(output) => output,
            Err(err) => {
                let reason = DisplayErrorContext(&err).to_string();
                let service_err = err.into_service_error();
                let classified = if service_err.is_resource_not_found_exception() {
                    SecretError::NotFound(id.to_string())
                } else if service_err.code() == Some(ACCESS_DENIED) {
                    SecretError::AccessDenied(id.to_string())
                } else {
                    SecretError::Unreachable {
                        id: id.to_string(),
                        reason,
                    }
                };
                return Err(classified.into());
            }
        };

        if let Some(s) = output.secret_string() {
            return Ok(Some(s.to_string()));
        }

        // Binary secrets are accepted when they hold UTF-8 text.
        let binary = output
            .secret_binary()
            .and_then(|blob| String::from_utf8(blob.as_ref().to_vec()).ok());
        Ok(binary)
    }
}
