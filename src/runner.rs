//! Top-level sequencing.
//!
//! Materialization always completes before registration: the host may
//! start the function as soon as the extension registers.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::config::Config;
use crate::core::env::{EnvFile, Prepared};
use crate::core::lifecycle::{Extension, LifecycleApi, StopReason};
use crate::core::secrets::{self, SecretStore};
use crate::error::Result;

/// Outcome of the materialization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    /// An existing env file was kept.
    Skipped,
    /// The env file was (re)written.
    Written {
        references: usize,
        failed: usize,
        lines: usize,
    },
}

/// Resolve secret references found in `vars` and write the env file.
///
/// Per-secret failures are logged and skipped.
///
/// # Errors
///
/// Only env file errors are returned; they are fatal.
pub async fn materialize<S, I>(config: &Config, store: &S, vars: I) -> Result<Materialized>
where
    S: SecretStore + ?Sized,
    I: IntoIterator<Item = (String, String)>,
{
    let env_file = EnvFile::from_config(config);
    if env_file.prepare()? == Prepared::AlreadyPresent {
        info!(path = %env_file.path().display(), "env file already present, skipping secrets");
        return Ok(Materialized::Skipped);
    }

    let refs = secrets::scan(vars, config);
    let references = refs.len();
    let resolutions = secrets::resolve_all(store, refs).await;

    let failed = resolutions.iter().filter(|r| r.result.is_err()).count();
    let lines = env_file.write(resolutions.iter().filter_map(|r| r.result.as_ref().ok()))?;

    info!(
        path = %env_file.path().display(),
        references,
        failed,
        lines,
        "env file materialized"
    );
    Ok(Materialized::Written {
        references,
        failed,
        lines,
    })
}

/// Materialize secrets, register, then block on lifecycle events.
///
/// # Errors
///
/// Returns env file and registration errors; both are fatal.
pub async fn run<S, A, I>(
    config: &Config,
    store: &S,
    api: A,
    vars: I,
    cancel: &CancellationToken,
) -> Result<StopReason>
where
    S: SecretStore + ?Sized,
    A: LifecycleApi,
    I: IntoIterator<Item = (String, String)>,
{
    materialize(config, store, vars).await?;

    let mut extension = Extension::new(api, config.extension_name.clone());
    extension.register().await?;
    extension.run(cancel).await
}
