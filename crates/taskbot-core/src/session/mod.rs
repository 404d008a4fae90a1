//! Conversation persistence seam
//!
//! The memory service that keeps chat history between messages is external.
//! A turn only needs to load the conversation for a chat thread before it
//! runs and save it afterwards.

mod memory;
mod traits;

pub use memory::MemorySessionStore;
pub use traits::{SessionError, SessionKey, SessionResult, SessionStore};
