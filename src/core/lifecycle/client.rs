//! HTTP transport for the Lambda Extensions API.
//!
//! No request timeout is set: "next event" blocks for as long as the host
//! has nothing to report.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::json;
use tracing::{trace, warn};

use super::{LifecycleApi, LifecycleEvent, Registration, RegistrationInfo};
use crate::core::config::Config;
use crate::core::constants::{
    EXTENSION_API_VERSION, EXTENSION_ID_HEADER, EXTENSION_NAME_HEADER, SUBSCRIBED_EVENTS,
};
use crate::error::{LifecycleError, Result};

/// Runtime API client.
#[derive(Debug, Clone)]
pub struct RuntimeApiClient {
    client: Client,
    base_url: String,
}

impl RuntimeApiClient {
    /// `base_url` must include the scheme, e.g. `http://127.0.0.1:9001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.runtime_api.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/extension/{}", self.base_url, EXTENSION_API_VERSION, path)
    }
}

async fn check_status(operation: &'static str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(LifecycleError::Status {
        operation,
        status: status.as_u16(),
        body,
    }
    .into())
}

#[async_trait]
impl LifecycleApi for RuntimeApiClient {
    async fn register(&self, name: &str) -> Result<Registration> {
        trace!(name, "registering extension");

        let resp = self
            .client
            .post(self.url("register"))
            .header(EXTENSION_NAME_HEADER, name)
            .json(&json!({ "events": SUBSCRIBED_EVENTS }))
            .send()
            .await
            .map_err(LifecycleError::from)?;
        let resp = check_status("register", resp).await?;

        let extension_id = resp
            .headers()
            .get(EXTENSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(LifecycleError::MissingIdentifier(EXTENSION_ID_HEADER))?;

        let body = resp.text().await.map_err(LifecycleError::from)?;
        let info = match serde_json::from_str::<RegistrationInfo>(&body) {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "unreadable registration body");
                RegistrationInfo::default()
            }
        };

        Ok(Registration { extension_id, info })
    }

    async fn next_event(&self, extension_id: &str) -> Result<LifecycleEvent> {
        trace!("waiting for next event");

        let resp = self
            .client
            .get(self.url("event/next"))
            .header(EXTENSION_ID_HEADER, extension_id)
            .send()
            .await
            .map_err(LifecycleError::from)?;
        let resp = check_status("next event", resp).await?;

        let event = resp
            .json::<LifecycleEvent>()
            .await
            .map_err(LifecycleError::from)?;
        Ok(event)
    }
}
