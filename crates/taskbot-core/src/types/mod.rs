//! Core types for model interactions
//!
//! This module contains the message and tool types shared by the model
//! seam, the tool adapter and the orchestrator.

mod message;
mod tool;

pub use message::{ChatMessage, ContentPart, MessageRole, MessageContent};
pub use tool::{Tool, ToolCall, ToolResult};
