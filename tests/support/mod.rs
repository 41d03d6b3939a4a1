//! Test support utilities for secrets-to-env integration tests.
//!
//! In-memory fakes for the secret store and lifecycle API, plus a mock
//! Extensions API served over HTTP.

#![allow(dead_code)]

pub mod fixtures;
pub mod runtime_api;

#[allow(unused_imports)]
pub use fakes::*;
#[allow(unused_imports)]
pub use fixtures::*;

use secrets_to_env::core::config::{Config, Options};
use secrets_to_env::core::env::Policy;
use tempfile::TempDir;

/// Isolated env file location plus a config pointing at it.
pub struct Test {
    pub dir: TempDir,
    pub config: Config,
}

impl Test {
    pub fn new(policy: Policy) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let config = Config::from_vars(
            vars(&[("AWS_LAMBDA_RUNTIME_API", "127.0.0.1:9001")]),
            "/opt/extensions/secrets-to-env",
            Options {
                env_file: Some(dir.path().join(".env")),
                policy: Some(policy),
                ..Options::default()
            },
        )
        .expect("failed to build config");

        Self { dir, config }
    }

    pub fn env_path(&self) -> std::path::PathBuf {
        self.config.env_file.clone()
    }

    /// Env file lines, sorted.
    pub fn lines(&self) -> Vec<String> {
        let content = std::fs::read_to_string(self.env_path()).expect("env file missing");
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        lines.sort();
        lines
    }
}

/// Build an owned variable list.
pub fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
