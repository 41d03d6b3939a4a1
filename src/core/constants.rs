//! Constants used throughout the extension.
//!
//! Centralizes magic strings and configuration defaults.

/// Suffix marking an environment variable as a secret reference.
pub const SECRET_SUFFIX: &str = "_SECRET_ARN";

/// Variables that end with [`SECRET_SUFFIX`] but are consumed by other
/// extensions and must never be resolved here.
pub const DEFAULT_EXCLUDE: &[&str] = &["DD_API_KEY_SECRET_ARN"];

/// Materialized env file read by the function runtime.
pub const ENV_FILE: &str = "/tmp/.env";

/// Host-provided address of the runtime API (`host:port`).
pub const RUNTIME_API_VAR: &str = "AWS_LAMBDA_RUNTIME_API";

/// Log filter environment variable.
pub const LOG_VAR: &str = "SECRETS_TO_ENV_LOG";

/// Extensions API version path segment.
pub const EXTENSION_API_VERSION: &str = "2020-01-01";

/// Request header carrying the extension name on registration.
pub const EXTENSION_NAME_HEADER: &str = "Lambda-Extension-Name";

/// Response/request header carrying the registered extension identifier.
pub const EXTENSION_ID_HEADER: &str = "Lambda-Extension-Identifier";

/// Event kinds the extension subscribes to.
pub const SUBSCRIBED_EVENTS: &[&str] = &["INVOKE", "SHUTDOWN"];
