//! Runtime configuration.
//!
//! Built once at startup from the process environment plus CLI
//! overrides, then borrowed by every stage.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::core::env::Policy;
use crate::error::{ConfigError, Result};

/// Extension configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the runtime API, always with a scheme and no trailing slash.
    pub runtime_api: String,
    /// Name registered with the lifecycle API. Must match the executable name.
    pub extension_name: String,
    /// Path of the materialized env file.
    pub env_file: PathBuf,
    /// Suffix identifying secret references.
    pub suffix: String,
    /// Variable names never treated as secret references.
    pub exclude: BTreeSet<String>,
    /// What to do with an env file left by a previous run.
    pub policy: Policy,
}

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub env_file: Option<PathBuf>,
    pub policy: Option<Policy>,
    pub exclude: Vec<String>,
    pub name: Option<String>,
}

impl Config {
    /// Build configuration from the current process.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVar` if the runtime API address is unset.
    pub fn from_env(options: Options) -> Result<Self> {
        let argv0 = std::env::args_os().next().unwrap_or_default();
        Self::from_vars(process_vars(), argv0, options)
    }

    /// Build configuration from an explicit variable set and executable path.
    pub fn from_vars<I>(vars: I, argv0: impl AsRef<Path>, options: Options) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let runtime_api = vars
            .into_iter()
            .find(|(k, _)| k == constants::RUNTIME_API_VAR)
            .map(|(_, v)| v)
            .ok_or(ConfigError::MissingVar(constants::RUNTIME_API_VAR))?;
        let runtime_api = normalize_runtime_api(&runtime_api)?;

        let extension_name = match options.name {
            Some(name) => name,
            None => extension_name(argv0.as_ref())?,
        };

        let mut exclude: BTreeSet<String> = constants::DEFAULT_EXCLUDE
            .iter()
            .map(|s| s.to_string())
            .collect();
        exclude.extend(
            options
                .exclude
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        );

        let config = Self {
            runtime_api,
            extension_name,
            env_file: options
                .env_file
                .unwrap_or_else(|| PathBuf::from(constants::ENV_FILE)),
            suffix: constants::SECRET_SUFFIX.to_string(),
            exclude,
            policy: options.policy.unwrap_or_default(),
        };

        debug!(
            runtime_api = %config.runtime_api,
            extension = %config.extension_name,
            env_file = %config.env_file.display(),
            policy = %config.policy,
            "config loaded"
        );

        Ok(config)
    }

    /// Whether a variable name designates a secret reference.
    pub fn is_secret_reference(&self, name: &str) -> bool {
        !self.exclude.contains(name) && name.ends_with(&self.suffix)
    }
}

/// Current process variables that are valid UTF-8.
pub fn process_vars() -> Vec<(String, String)> {
    utf8_vars(std::env::vars_os())
}

/// Keep pairs whose name and value are both UTF-8.
///
/// Such a variable can never be a usable secret reference, and one stray
/// variable must not stop the extension from starting.
pub fn utf8_vars<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (name, _) => {
                let name = match name {
                    Ok(name) => name,
                    Err(raw) => raw.to_string_lossy().into_owned(),
                };
                debug!(var = %name, "skipping non UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// Extension name is the file name of the executable.
fn extension_name(argv0: &Path) -> Result<String> {
    argv0
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::InvalidExtensionName(argv0.display().to_string()).into())
}

/// The host hands out `host:port`; tests and local runs may pass a full URL.
fn normalize_runtime_api(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::MissingVar(constants::RUNTIME_API_VAR).into());
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidRuntimeApi(raw.to_string()).into());
    }

    let base = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };
    Ok(base.trim_end_matches('/').to_string())
}
