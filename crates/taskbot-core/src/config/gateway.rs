//! Resolved runtime configuration
//!
//! Values are resolved once per process and are immutable afterwards; the
//! `TokenManager` and `GatewayClient` take them by value at construction.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use super::error::{ConfigError, ConfigResult};
use super::file::ConfigFile;
use crate::agent::DEFAULT_SYSTEM_PROMPT;
use crate::secrets::{EnvSecretStore, SecretStore};

/// Default bound for the credential exchange
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(30);
/// Default bound for `tools/list`
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(60);
/// Default bound for `tools/call`; remote tools may call cloud APIs themselves
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Default model identifier passed to the model runtime
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

/// OAuth2 client-credentials identity for one gateway
#[derive(Debug, Clone)]
pub struct Credential {
    client_id: String,
    client_secret: SecretString,
    token_endpoint: String,
}

impl Credential {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            token_endpoint: token_endpoint.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    pub(crate) fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }
}

/// Per-call network bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Credential exchange against the token endpoint
    pub token: Duration,
    /// `tools/list`
    pub list: Duration,
    /// `tools/call`
    pub call: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN_TIMEOUT,
            list: DEFAULT_LIST_TIMEOUT,
            call: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Everything the gateway client needs
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// JSON-RPC endpoint of the gateway
    pub url: String,
    pub credential: Credential,
    pub timeouts: Timeouts,
}

impl GatewayConfig {
    pub fn new(url: impl Into<String>, credential: Credential) -> Self {
        Self {
            url: url.into(),
            credential,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Resolve from the process environment only
    pub fn from_env() -> ConfigResult<Self> {
        Self::resolve(&ConfigFile::default(), &EnvSecretStore::new())
    }

    /// Resolve from a config file overlaid with a secret store
    ///
    /// Store values win over file values. The client secret is only ever
    /// read from the store.
    pub fn resolve(file: &ConfigFile, secrets: &dyn SecretStore) -> ConfigResult<Self> {
        let section = &file.gateway;

        let url = pick(secrets, "gateway_url", section.url.as_deref())?;
        validate_url("gateway_url", &url)?;

        let token_endpoint = pick(secrets, "token_endpoint", section.token_endpoint.as_deref())?;
        validate_url("token_endpoint", &token_endpoint)?;

        let client_id = pick(secrets, "client_id", section.client_id.as_deref())?;
        let client_secret = secrets
            .get("client_secret")
            .ok_or_else(|| ConfigError::Missing("client_secret".to_string()))?;

        let defaults = Timeouts::default();
        let timeouts = Timeouts {
            token: seconds(secrets, "GATEWAY_TOKEN_TIMEOUT_SECS", section.timeouts.token_secs, defaults.token)?,
            list: seconds(secrets, "GATEWAY_LIST_TIMEOUT_SECS", section.timeouts.list_secs, defaults.list)?,
            call: seconds(secrets, "GATEWAY_CALL_TIMEOUT_SECS", section.timeouts.call_secs, defaults.call)?,
        };

        Ok(Self {
            url,
            credential: Credential::new(client_id, client_secret, token_endpoint),
            timeouts,
        })
    }
}

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Instructions sent with every model turn
    pub system_prompt: String,
    /// Model identifier understood by the model runtime
    pub model_id: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
        }
    }
}

impl AgentConfig {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn resolve(file: &ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            system_prompt: file.agent.system_prompt.clone().unwrap_or(defaults.system_prompt),
            model_id: file.agent.model_id.clone().unwrap_or(defaults.model_id),
        }
    }
}

fn pick(secrets: &dyn SecretStore, key: &str, fallback: Option<&str>) -> ConfigResult<String> {
    secrets
        .get(key)
        .or_else(|| fallback.filter(|v| !v.is_empty()).map(str::to_string))
        .ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn seconds(
    secrets: &dyn SecretStore,
    key: &str,
    fallback: Option<u64>,
    default: Duration,
) -> ConfigResult<Duration> {
    let secs = match secrets.get(key) {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw.clone(),
        })?,
        None => match fallback {
            Some(secs) => secs,
            None => return Ok(default),
        },
    };

    if secs == 0 {
        return Err(ConfigError::Invalid {
            key: key.to_string(),
            value: "0".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn validate_url(key: &str, value: &str) -> ConfigResult<()> {
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
