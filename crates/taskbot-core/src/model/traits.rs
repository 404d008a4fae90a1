//! Conversational model trait definition

use async_trait::async_trait;

use super::error::ModelResult;
use crate::types::{ChatMessage, Tool, ToolCall};

/// Everything the model sees for one step of a turn
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    /// Model identifier the backend should invoke
    pub model_id: &'a str,
    /// Instructions for the assistant
    pub system_prompt: &'a str,
    /// Conversation so far, oldest first
    pub messages: &'a [ChatMessage],
    /// Tools the model may request this turn
    pub tools: &'a [Tool],
}

impl<'a> ModelRequest<'a> {
    pub fn new(model_id: &'a str, system_prompt: &'a str, messages: &'a [ChatMessage], tools: &'a [Tool]) -> Self {
        Self {
            model_id,
            system_prompt,
            messages,
            tools,
        }
    }

    /// Most recent plain-text user message
    pub fn last_user_text(&self) -> Option<&'a str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == crate::types::MessageRole::User)
            .find_map(|m| m.text())
    }
}

/// One model step: optional text plus zero or more tool requests
///
/// A reply without tool calls is the final answer for the turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelReply {
    /// Final answer
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Tool requests with no accompanying text
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls: calls,
        }
    }

    /// Attach text to a reply, typically the progress note before a tool call
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }

    /// Text if present and non-blank
    pub fn visible_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// The conversational model, treated as a black box
///
/// Implementations wrap whatever runtime hosts the model. The orchestrator
/// calls `respond` once per model step and never concurrently within a turn.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logging
    fn name(&self) -> &str;

    /// Produce the next reply for the conversation
    async fn respond(&self, request: ModelRequest<'_>) -> ModelResult<ModelReply>;
}
