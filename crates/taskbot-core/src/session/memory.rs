//! In-memory session store

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::traits::{SessionKey, SessionResult, SessionStore};
use crate::agent::Conversation;

/// Keeps conversations for the life of the process
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionKey, Conversation>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, key: &SessionKey) -> SessionResult<Conversation> {
        Ok(self.sessions.read().get(key).cloned().unwrap_or_default())
    }

    async fn save(&self, key: &SessionKey, conversation: &Conversation) -> SessionResult<()> {
        self.sessions.write().insert(key.clone(), conversation.clone());
        Ok(())
    }
}
