//! Secret reference discovery and resolution.
//!
//! Scans the environment for variables ending in the reference suffix,
//! fetches each referenced secret and flattens its JSON payload into
//! name/value pairs.
//!
//! ## Adding a New Secret Store
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file next to `aws.rs`
//! 3. Re-export from this module

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::config::Config;
use crate::error::{Result, SecretError};

mod aws;

pub use aws::AwsSecretsManager;

/// Secret store trait.
///
/// `get_secret` returns the raw payload, or `None` when the secret
/// exists but carries no string payload.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, id: &str) -> Result<Option<String>>;
}

/// An environment variable recognized as pointing to a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretReference {
    /// Variable name, e.g. `DB_SECRET_ARN`.
    pub name: String,
    /// Opaque identifier understood by the secret store.
    pub id: String,
}

/// Flattened contents of one secret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSecretSet {
    pub entries: Vec<(String, String)>,
}

impl ResolvedSecretSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of resolving one reference.
#[derive(Debug)]
pub struct Resolution {
    pub reference: SecretReference,
    pub result: Result<ResolvedSecretSet>,
}

/// Collect secret references from a variable set.
///
/// Sorted by variable name so the env file layout is stable across runs.
pub fn scan<I>(vars: I, config: &Config) -> Vec<SecretReference>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut refs: Vec<SecretReference> = vars
        .into_iter()
        .filter(|(name, _)| config.is_secret_reference(name))
        .map(|(name, id)| SecretReference { name, id })
        .collect();
    refs.sort_by(|a, b| a.name.cmp(&b.name));
    refs
}

/// Parse a raw payload as a flat JSON object.
///
/// String values are kept verbatim, `null` becomes the empty string and
/// every other value is rendered as compact JSON.
pub fn parse_payload(id: &str, raw: Option<&str>) -> Result<ResolvedSecretSet> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(SecretError::Empty(id.to_string()).into()),
    };

    let value: Value = serde_json::from_str(raw).map_err(|e| SecretError::Malformed {
        id: id.to_string(),
        reason: e.to_string(),
    })?;

    let Value::Object(map) = value else {
        return Err(SecretError::Malformed {
            id: id.to_string(),
            reason: "expected a JSON object".to_string(),
        }
        .into());
    };

    let entries = map
        .into_iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k, v)
        })
        .collect();

    Ok(ResolvedSecretSet { entries })
}

/// Fetch and parse one reference.
pub async fn resolve<S>(store: &S, reference: &SecretReference) -> Result<ResolvedSecretSet>
where
    S: SecretStore + ?Sized,
{
    debug!(var = %reference.name, id = %reference.id, "fetching secret");
    let raw = store.get_secret(&reference.id).await?;
    parse_payload(&reference.id, raw.as_deref())
}

/// Resolve every reference concurrently.
///
/// Failures stay attached to their reference; one bad secret never
/// prevents the others from resolving. Output order matches input order.
pub async fn resolve_all<S>(store: &S, refs: Vec<SecretReference>) -> Vec<Resolution>
where
    S: SecretStore + ?Sized,
{
    let results = join_all(refs.iter().map(|r| resolve(store, r))).await;

    refs.into_iter()
        .zip(results)
        .map(|(reference, result)| {
            match &result {
                Ok(set) => debug!(var = %reference.name, keys = set.len(), "secret resolved"),
                Err(e) => warn!(var = %reference.name, error = %e, "secret skipped"),
            }
            Resolution { reference, result }
        })
        .collect()
}
