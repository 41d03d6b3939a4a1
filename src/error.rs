//! Error types.
//!
//! Each stage of the extension has its own error enum. The top-level
//! [`Error`] wraps them so the runner can decide fatal-vs-skip in one place.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    EnvFile(#[from] EnvFileError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid runtime API address: {0}")]
    InvalidRuntimeApi(String),

    #[error("cannot derive extension name from executable path: {0}")]
    InvalidExtensionName(String),
}

/// Per-reference secret resolution errors.
///
/// These never abort the run; the runner logs and skips them.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("access denied to secret: {0}")]
    AccessDenied(String),

    #[error("secret store unreachable for {id}: {reason}")]
    Unreachable { id: String, reason: String },

    #[error("secret {0} has no payload")]
    Empty(String),

    #[error("secret {id} is not a JSON object: {reason}")]
    Malformed { id: String, reason: String },
}

/// Environment file errors. Always fatal.
#[derive(Error, Debug)]
pub enum EnvFileError {
    #[error("failed to remove stale env file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open env file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write env file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read env file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lifecycle API errors.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("lifecycle API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("lifecycle API returned {status} for {operation}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("lifecycle API response missing {0} header")]
    MissingIdentifier(&'static str),

    #[error("next event requested before registration")]
    NotRegistered,
}

pub type Result<T> = std::result::Result<T, Error>;
