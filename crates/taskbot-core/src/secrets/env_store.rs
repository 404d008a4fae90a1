//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Mapping from logical keys to environment variable names
///
/// The deployment scripts export the `GATEWAY_*` names; the `AGENTCORE_*`
/// aliases are what older deployments wrote.
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("gateway_url", vec!["GATEWAY_URL", "AGENTCORE_GATEWAY_URL"]);
    m.insert("client_id", vec!["GATEWAY_CLIENT_ID", "AGENTCORE_CLIENT_ID"]);
    m.insert("client_secret", vec!["GATEWAY_CLIENT_SECRET", "AGENTCORE_CLIENT_SECRET"]);
    m.insert("token_endpoint", vec!["GATEWAY_TOKEN_ENDPOINT", "AGENTCORE_TOKEN_ENDPOINT"]);
    m
});

/// Secret store that reads from environment variables
///
/// Read-only. Empty variables count as unset.
///
/// # Example
///
/// ```
/// use taskbot_core::secrets::{SecretStore, EnvSecretStore};
///
/// let store = EnvSecretStore::new();
///
/// // Equivalent if GATEWAY_CLIENT_ID is set:
/// let a = store.get("client_id");
/// let b = store.get("GATEWAY_CLIENT_ID");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Default)]
pub struct EnvSecretStore {
    _private: (),
}

impl EnvSecretStore {
    /// Create a new environment variable secret store
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Environment variable names consulted for a logical key
    pub fn env_vars_for(key: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(key.to_lowercase().as_str()).map(|v| v.as_slice())
    }

    fn read(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = Self::read(key) {
            return Some(value);
        }

        Self::env_vars_for(key)?
            .iter()
            .find_map(|name| Self::read(name))
    }

    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    fn delete(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }
}
