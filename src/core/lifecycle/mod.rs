//! Lifecycle registration and event polling.
//!
//! The extension registers once, then blocks on "next event" until the
//! host sends `SHUTDOWN`, the transport fails, or cancellation is observed.
//!
//! ```text
//! Unregistered ──register──▶ Registered ──run──▶ Polling ──▶ Done
//!                                                  │  ▲
//!                                                  └──┘ non-shutdown event
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{LifecycleError, Result};

mod client;

pub use client::RuntimeApiClient;

/// Host lifecycle API.
#[async_trait]
pub trait LifecycleApi: Send + Sync {
    /// Register the extension under `name`.
    async fn register(&self, name: &str) -> Result<Registration>;

    /// Block until the host delivers the next event.
    async fn next_event(&self, extension_id: &str) -> Result<LifecycleEvent>;
}

/// Registration acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Identifier to present on every subsequent call.
    pub extension_id: String,
    pub info: RegistrationInfo,
}

/// Function metadata returned on registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationInfo {
    pub function_name: String,
    pub function_version: String,
    pub handler: String,
}

/// Event received from the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "eventType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleEvent {
    #[serde(rename_all = "camelCase")]
    Invoke {
        #[serde(default)]
        request_id: String,
        #[serde(default)]
        deadline_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    Shutdown {
        #[serde(default)]
        shutdown_reason: String,
        #[serde(default)]
        deadline_ms: u64,
    },
    #[serde(other)]
    Other,
}

impl LifecycleEvent {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown { .. })
    }
}

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Host sent `SHUTDOWN`.
    Shutdown,
    /// Cancellation token fired.
    Cancelled,
    /// "next event" failed; treated as an instruction to stop.
    TransportError,
}

/// Extension lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unregistered,
    Registered,
    Polling,
    Done(StopReason),
}

/// Drives one extension through its lifecycle.
pub struct Extension<A> {
    api: A,
    name: String,
    registration: Option<Registration>,
    state: State,
}

impl<A: LifecycleApi> Extension<A> {
    pub fn new(api: A, name: impl Into<String>) -> Self {
        Self {
            api,
            name: name.into(),
            registration: None,
            state: State::Unregistered,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn registration(&self) -> Option<&Registration> {
        self.registration.as_ref()
    }

    /// Register with the host.
    ///
    /// # Errors
    ///
    /// Any failure is returned to the caller; the host will not run the
    /// function for an extension that failed to register.
    pub async fn register(&mut self) -> Result<&Registration> {
        let registration = self.api.register(&self.name).await?;
        info!(
            extension = %self.name,
            function = %registration.info.function_name,
            version = %registration.info.function_version,
            "registered"
        );
        self.state = State::Registered;
        Ok(self.registration.insert(registration))
    }

    /// Poll events until shutdown, transport failure or cancellation.
    ///
    /// Cancellation is checked only between calls; an in-flight
    /// "next event" request is never interrupted.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::NotRegistered` if called before `register`.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<StopReason> {
        let extension_id = match (&self.state, &self.registration) {
            (State::Registered, Some(r)) => r.extension_id.clone(),
            _ => return Err(LifecycleError::NotRegistered.into()),
        };
        self.state = State::Polling;

        let reason = loop {
            if cancel.is_cancelled() {
                info!("cancelled, leaving event loop");
                break StopReason::Cancelled;
            }

            match self.api.next_event(&extension_id).await {
                Ok(LifecycleEvent::Shutdown {
                    shutdown_reason, ..
                }) => {
                    info!(reason = %shutdown_reason, "shutdown event received");
                    break StopReason::Shutdown;
                }
                Ok(event) => debug!(?event, "event received"),
                Err(e) => {
                    error!(error = %e, "failed to fetch next lifecycle event");
                    break StopReason::TransportError;
                }
            }
        };

        self.state = State::Done(reason);
        Ok(reason)
    }
}
