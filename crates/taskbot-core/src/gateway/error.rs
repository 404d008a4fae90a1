//! Errors on the tool call path

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by the token manager, the gateway client and the tool adapter
///
/// All of them travel unmodified up to the orchestrator, which decides how
/// to present them. Cloneable so one failed token exchange can be reported
/// to every caller that waited on it.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// The token endpoint rejected the credential exchange
    #[error("Authentication failed ({status}): {body}")]
    Authentication { status: u16, body: String },

    /// The gateway answered with a non-success HTTP status
    #[error("Gateway returned HTTP {status} for {method}")]
    Transport { status: u16, method: String },

    /// A network call exceeded its bound
    #[error("{operation} timed out after {}s", timeout.as_secs_f64())]
    Timeout { operation: String, timeout: Duration },

    /// Wrapped tool arguments could not be decoded
    #[error("Invalid arguments for tool {tool}: cannot decode {raw:?}: {reason}")]
    ArgumentDecode {
        tool: String,
        raw: String,
        reason: String,
    },

    /// Connection-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(Arc<reqwest::Error>),

    /// JSON-RPC error member returned by the gateway
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Body could not be understood at all
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Name not present in the current tool set
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl GatewayError {
    pub fn transport(status: u16, method: impl Into<String>) -> Self {
        Self::Transport {
            status,
            method: method.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Classify a reqwest failure that happened while performing `operation`
    pub(crate) fn from_reqwest(err: reqwest::Error, operation: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::timeout(operation, timeout)
        } else if err.is_decode() {
            Self::InvalidResponse(format!("{}: {}", operation, err))
        } else {
            Self::Http(Arc::new(err))
        }
    }

    /// Whether the failure came from the credential exchange
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
