//! Agent orchestrator
//!
//! Drives one conversational turn at a time: discover the gateway's tools,
//! let the model answer or request tools, run requested tools one after
//! another, and relay progress and the final answer through an
//! `OutputSink`.
//!
//! ```rust,ignore
//! use taskbot_core::agent::{Agent, BufferSink, Conversation};
//!
//! let agent = Agent::new(gateway, model, AgentConfig::default(), logger);
//! let sink = BufferSink::new();
//! let outcome = agent.run(&mut Conversation::new(), "check the clusters", &sink).await?;
//! ```

mod conversation;
mod orchestrator;
mod output;
mod prompt;

pub use conversation::Conversation;
pub use orchestrator::{failure_message, Agent, AgentError, TurnOutcome, TurnStatus};
pub use output::{BufferSink, FnSink, OutputSink, SinkError};
pub use prompt::DEFAULT_SYSTEM_PROMPT;
