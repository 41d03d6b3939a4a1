//! Command-line interface.
//!
//! The host starts extensions without arguments, so every flag has an
//! environment variable fallback.

use clap::Parser;
use std::path::PathBuf;

use crate::core::config::Options;
use crate::core::env::Policy;

/// Materialize Secrets Manager references into an env file, then follow
/// the Lambda extension lifecycle.
#[derive(Parser, Debug)]
#[command(name = "secrets-to-env", version)]
pub struct Cli {
    /// Path of the env file to write
    #[arg(long, env = "SECRETS_TO_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Existing env file handling: rebuild or skip
    #[arg(long, env = "SECRETS_TO_ENV_POLICY")]
    pub policy: Option<Policy>,

    /// Additional variable names to ignore (repeatable, comma separated)
    #[arg(long, env = "SECRETS_TO_ENV_EXCLUDE", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Extension name to register (defaults to the executable name)
    #[arg(long, env = "SECRETS_TO_ENV_NAME")]
    pub name: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options {
            env_file: self.env_file.clone(),
            policy: self.policy,
            exclude: self.exclude.clone(),
            name: self.name.clone(),
        }
    }
}
