//! TaskBot Core
//!
//! Bridges a remote tool gateway into a conversational agent loop.
//! The gateway is a JSON-RPC 2.0 endpoint behind OAuth2 client credentials
//! that exposes a set of tools which can change at any time. This crate
//! discovers those tools each turn, hands them to a model, and runs the
//! calls the model makes.
//!
//! ## Layers
//!
//! - `auth`: OAuth2 token lifecycle with single-flight refresh
//! - `gateway`: `tools/list` and `tools/call` over HTTP
//! - `tools`: argument normalization, dispatch by name, result extraction
//! - `agent`: the per-turn state machine and output sinks
//!
//! The model (`model`) and conversation persistence (`session`) are seams
//! for external collaborators.
//!
//! ```rust,ignore
//! use taskbot_core::{Agent, ConsoleLogger, Conversation, EnvSecretStore, GatewayClient, Settings};
//!
//! let logger: SharedLogger = Arc::new(ConsoleLogger::new());
//! let settings = Settings::load(None, &EnvSecretStore::new())?;
//! let gateway = Arc::new(GatewayClient::new(settings.gateway, logger.clone()));
//! let agent = Agent::new(gateway, model, settings.agent, logger);
//!
//! let reply = agent.run_text(&mut Conversation::new(), "list the EKS clusters").await?;
//! ```

pub mod agent;
pub mod auth;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod secrets;
pub mod session;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use types::{ChatMessage, ContentPart, MessageContent, MessageRole, Tool, ToolCall, ToolResult};

pub use secrets::{EnvSecretStore, MemorySecretStore, SecretStore, SecretStoreError, SecretStoreResult};

pub use logging::{ConsoleLogger, Logger, NoOpLogger, SharedLogger, TracingLogger};

pub use config::{AgentConfig, ConfigError, ConfigResult, Credential, GatewayConfig, Settings, Timeouts};

pub use auth::TokenManager;

pub use gateway::{GatewayClient, GatewayError, GatewayResult, ToolDescriptor, ToolGateway};

pub use tools::{ToolRegistry, ToolSet};

pub use model::{ChatModel, ModelError, ModelReply, ModelRequest, ModelResult};

pub use agent::{Agent, AgentError, BufferSink, Conversation, FnSink, OutputSink, SinkError, TurnOutcome};

pub use session::{MemorySessionStore, SessionKey, SessionStore};
