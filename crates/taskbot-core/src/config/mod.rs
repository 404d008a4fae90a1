//! Configuration for the bridge
//!
//! Values come from, lowest precedence first:
//! - built-in defaults
//! - an optional YAML file (`ConfigFile`)
//! - a `SecretStore`, the environment by default
//!
//! The result is immutable and constructed once per process.

mod error;
mod file;
mod gateway;

pub use error::{ConfigError, ConfigResult};
pub use file::{AgentSection, ConfigFile, GatewaySection, Settings, TimeoutSection};
pub use gateway::{
    AgentConfig, Credential, GatewayConfig, Timeouts,
    DEFAULT_CALL_TIMEOUT, DEFAULT_LIST_TIMEOUT, DEFAULT_MODEL_ID, DEFAULT_TOKEN_TIMEOUT,
};
