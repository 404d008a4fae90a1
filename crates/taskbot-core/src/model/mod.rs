//! Conversational model seam
//!
//! The model itself is an external collaborator. The orchestrator only needs
//! something that takes the conversation plus the current tool definitions
//! and answers with text, tool requests, or both.
//!
//! `ScriptedModel` replays canned replies and is what the tests drive turns
//! with.

mod error;
mod mock;
mod traits;

pub use error::{ModelError, ModelResult};
pub use mock::{RecordedRequest, ScriptedModel};
pub use traits::{ChatModel, ModelReply, ModelRequest};
