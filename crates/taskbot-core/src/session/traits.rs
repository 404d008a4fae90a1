//! Session store trait definition

use async_trait::async_trait;
use thiserror::Error;

use crate::agent::Conversation;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session backend error: {0}")]
    Backend(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Identifies one conversation: who is talking, in which thread
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    actor_id: String,
    session_id: String,
}

impl SessionKey {
    /// Chat thread ids are timestamps like `1712345678.123456`; the memory
    /// service rejects dots in session ids, so they become dashes.
    pub fn new(actor_id: impl Into<String>, session_id: impl AsRef<str>) -> Self {
        Self {
            actor_id: actor_id.into(),
            session_id: Self::sanitize(session_id.as_ref()),
        }
    }

    pub fn sanitize(value: &str) -> String {
        value.replace('.', "-")
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.actor_id, self.session_id)
    }
}

/// Loads and saves conversations between turns
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Backend name, for logging
    fn name(&self) -> &str;

    /// Stored conversation, or an empty one for a new session
    async fn load(&self, key: &SessionKey) -> SessionResult<Conversation>;

    /// Replace the stored conversation
    async fn save(&self, key: &SessionKey, conversation: &Conversation) -> SessionResult<()>;
}
