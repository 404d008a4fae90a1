//! File-based configuration (YAML)
//!
//! Holds the non-secret settings produced by the deployment scripts:
//!
//! ```yaml
//! gateway:
//!   url: https://gateway.example.com/mcp
//!   token_endpoint: https://auth.example.com/oauth2/token
//!   client_id: taskbot
//!   timeouts:
//!     list_secs: 60
//!     call_secs: 120
//! agent:
//!   model_id: anthropic.claude-3-5-sonnet-20240620-v1:0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::ConfigResult;
use super::gateway::{AgentConfig, GatewayConfig};
use crate::secrets::SecretStore;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub agent: AgentSection,
}

/// `gateway:` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewaySection {
    pub url: Option<String>,
    pub token_endpoint: Option<String>,
    pub client_id: Option<String>,
    #[serde(default)]
    pub timeouts: TimeoutSection,
}

/// `gateway.timeouts:` section, in whole seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeoutSection {
    pub token_secs: Option<u64>,
    pub list_secs: Option<u64>,
    pub call_secs: Option<u64>,
}

/// `agent:` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSection {
    pub system_prompt: Option<String>,
    pub model_id: Option<String>,
}

impl ConfigFile {
    /// User-level location (`~/.config/taskbot/config.yaml` on Linux)
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("taskbot").join("config.yaml")
    }

    /// Load from `path`; a missing file yields the empty configuration
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Fully resolved settings for one process
#[derive(Debug, Clone)]
pub struct Settings {
    pub gateway: GatewayConfig,
    pub agent: AgentConfig,
}

impl Settings {
    /// Resolve from an optional YAML file overlaid with a secret store
    ///
    /// `None` reads [`ConfigFile::default_path`].
    pub fn load(path: Option<&Path>, secrets: &dyn SecretStore) -> ConfigResult<Self> {
        let file = match path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::load(ConfigFile::default_path())?,
        };
        Self::from_file(&file, secrets)
    }

    pub fn from_file(file: &ConfigFile, secrets: &dyn SecretStore) -> ConfigResult<Self> {
        Ok(Self {
            gateway: GatewayConfig::resolve(file, secrets)?,
            agent: AgentConfig::resolve(file),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::config::ConfigError;
    use crate::secrets::MemorySecretStore;

    const SAMPLE: &str = r#"
gateway:
  url: https://gateway.example.com/mcp
  token_endpoint: https://auth.example.com/oauth2/token
  client_id: taskbot
  timeouts:
    call_secs: 120
agent:
  system_prompt: You are a DevOps assistant.
"#;

    #[test]
    fn test_parse_sample() {
        let file = ConfigFile::parse(SAMPLE).unwrap();
        assert_eq!(file.gateway.client_id.as_deref(), Some("taskbot"));
        assert_eq!(file.gateway.timeouts.call_secs, Some(120));
        assert_eq!(file.gateway.timeouts.list_secs, None);
        assert_eq!(file.agent.model_id, None);
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert_eq!(ConfigFile::parse("").unwrap(), ConfigFile::default());
        assert!(matches!(ConfigFile::parse("gateway: [1, 2"), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = ConfigFile::load(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(file, ConfigFile::default());
    }

    #[test]
    fn test_settings_load_from_file_and_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let secrets = MemorySecretStore::with_secrets([("client_secret", "s3cr3t")]);
        let settings = Settings::load(Some(&path), &secrets).unwrap();

        assert_eq!(settings.gateway.url, "https://gateway.example.com/mcp");
        assert_eq!(settings.gateway.credential.client_id(), "taskbot");
        assert_eq!(settings.gateway.timeouts.call, Duration::from_secs(120));
        assert_eq!(settings.agent.system_prompt, "You are a DevOps assistant.");
    }
}
