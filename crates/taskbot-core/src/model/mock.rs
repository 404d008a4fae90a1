//! Scripted model for testing
//!
//! Replays a fixed sequence of replies without any network dependency and
//! records every request it receives.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::error::{ModelError, ModelResult};
use super::traits::{ChatModel, ModelReply, ModelRequest};
use crate::logging::Logger;
use crate::types::ChatMessage;

/// What the model was shown on one step
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub model_id: String,
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
    pub tool_names: Vec<String>,
}

/// Model that answers from a script
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ModelResult<ModelReply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    served: Mutex<usize>,
    logger: Arc<dyn Logger>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ModelReply>, logger: Arc<dyn Logger>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
            served: Mutex::new(0),
            logger,
        }
    }

    /// A model that answers once with fixed text
    pub fn fixed(text: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::new(vec![ModelReply::text(text)], logger)
    }

    /// Queue a failure
    pub fn push_error(&self, error: ModelError) {
        self.replies.lock().push_back(Err(error));
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Replies not yet served
    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn respond(&self, request: ModelRequest<'_>) -> ModelResult<ModelReply> {
        self.requests.lock().push(RecordedRequest {
            model_id: request.model_id.to_string(),
            system_prompt: request.system_prompt.to_string(),
            messages: request.messages.to_vec(),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
        });

        let next = self.replies.lock().pop_front();
        let mut served = self.served.lock();
        match next {
            Some(reply) => {
                *served += 1;
                self.logger.debug(&format!("ScriptedModel: serving reply {}", *served));
                reply
            }
            None => Err(ModelError::Exhausted(*served)),
        }
    }
}
