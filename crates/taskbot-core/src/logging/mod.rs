//! Logging abstractions for host-agnostic logging

mod traits;
mod console;
mod memory;
mod tracing_logger;

pub use traits::{LogLevel, Logger, NoOpLogger, SharedLogger};
pub use console::ConsoleLogger;
pub use memory::MemoryLogger;
pub use tracing_logger::TracingLogger;
