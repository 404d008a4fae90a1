//! Model error types

use thiserror::Error;

/// Errors raised by a conversational model implementation
#[derive(Error, Debug)]
pub enum ModelError {
    /// The model runtime rejected the request
    #[error("Model API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network/HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The reply could not be interpreted
    #[error("Invalid model reply: {0}")]
    InvalidReply(String),

    /// A scripted model ran out of replies
    #[error("Model script exhausted after {0} replies")]
    Exhausted(usize),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ModelError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_reply(message: impl Into<String>) -> Self {
        Self::InvalidReply(message.into())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
