//! Output channel back to the chat platform

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Output channel closed")]
    Closed,

    #[error("Failed to deliver message: {0}")]
    Delivery(String),
}

/// Receives the text a turn produces
///
/// Called zero or more times with progress notes and exactly once with the
/// final answer.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), SinkError>;
}

/// Adapts a synchronous closure, e.g. a chat client's post-message call
pub struct FnSink<F> {
    f: F,
}

impl<F> FnSink<F>
where
    F: Fn(&str) -> Result<(), SinkError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> OutputSink for FnSink<F>
where
    F: Fn(&str) -> Result<(), SinkError> + Send + Sync,
{
    async fn send(&self, text: &str) -> Result<(), SinkError> {
        (self.f)(text)
    }
}

/// Collects everything sent to it
#[derive(Debug, Default)]
pub struct BufferSink {
    messages: Mutex<Vec<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

#[async_trait]
impl OutputSink for BufferSink {
    async fn send(&self, text: &str) -> Result<(), SinkError> {
        self.messages.lock().push(text.to_string());
        Ok(())
    }
}
