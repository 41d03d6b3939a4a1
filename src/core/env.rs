//! Materialized env file.
//!
//! The function runtime loads this file as extra environment variables,
//! so it must be complete before the extension registers.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::core::config::Config;
use crate::core::secrets::ResolvedSecretSet;
use crate::error::{EnvFileError, Result};

/// Handling of an env file left behind by an earlier run in the same sandbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// Delete the old file and resolve everything again.
    #[default]
    Rebuild,
    /// Trust the old file and skip resolution entirely.
    SkipIfPresent,
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rebuild" => Ok(Self::Rebuild),
            "skip" | "skip-if-present" => Ok(Self::SkipIfPresent),
            other => Err(format!(
                "unknown policy: {}. Supported: rebuild, skip",
                other
            )),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rebuild => f.write_str("rebuild"),
            Self::SkipIfPresent => f.write_str("skip"),
        }
    }
}

/// Result of [`EnvFile::prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prepared {
    /// Target is absent; resolve and write.
    Ready,
    /// Target exists and the policy says to keep it.
    AlreadyPresent,
}

/// The env file at a fixed path.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    policy: Policy,
}

impl EnvFile {
    pub fn new(path: impl Into<PathBuf>, policy: Policy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.env_file.clone(), config.policy)
    }

    /// File path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply the idempotency policy before any secret is fetched.
    ///
    /// # Errors
    ///
    /// Returns `EnvFileError::Remove` if a stale file cannot be deleted.
    pub fn prepare(&self) -> Result<Prepared> {
        match self.policy {
            Policy::SkipIfPresent if self.path.exists() => {
                debug!(path = %self.path.display(), "env file present, skipping");
                Ok(Prepared::AlreadyPresent)
            }
            Policy::SkipIfPresent => Ok(Prepared::Ready),
            Policy::Rebuild => match std::fs::remove_file(&self.path) {
                Ok(()) => {
                    debug!(path = %self.path.display(), "removed stale env file");
                    Ok(Prepared::Ready)
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(Prepared::Ready),
                Err(source) => Err(EnvFileError::Remove {
                    path: self.path.clone(),
                    source,
                }
                .into()),
            },
        }
    }

    /// Append one `KEY=VALUE` line per pair across all sets.
    ///
    /// The file is created even when there is nothing to write so the
    /// runtime always finds it. Values are written unescaped. Keys that
    /// cannot be environment variable names are skipped.
    ///
    /// # Returns
    ///
    /// Number of lines written.
    ///
    /// # Errors
    ///
    /// Returns `EnvFileError::Open` or `EnvFileError::Write` on I/O failure.
    pub fn write<'a, I>(&self, sets: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a ResolvedSecretSet>,
    {
        let mut options = OpenOptions::new();
        options.create(true).append(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options.open(&self.path).map_err(|source| EnvFileError::Open {
            path: self.path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        let write_err = |source: std::io::Error| EnvFileError::Write {
            path: self.path.clone(),
            source,
        };

        let mut written = 0;
        for set in sets {
            for (key, value) in &set.entries {
                if !valid_key(key) {
                    warn!(key = %key, "skipping key that is not a valid variable name");
                    continue;
                }
                writeln!(writer, "{}={}", key, value).map_err(write_err)?;
                written += 1;
            }
        }
        writer.flush().map_err(write_err)?;

        debug!(path = %self.path.display(), lines = written, "env file written");
        Ok(written)
    }
}

/// Read an env file back, splitting each line on the first `=`.
///
/// Lines without `=` are ignored.
pub fn read_pairs(path: impl AsRef<Path>) -> Result<Vec<(String, String)>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| EnvFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(contents
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect())
}

fn valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['=', '\0', '\n', '\r'])
}
