//! Tool adapter
//!
//! Turns the gateway's descriptor list into tools the model can call, and
//! reconciles what the model sends with what the gateway expects.
//!
//! ```text
//! model ToolCall ──► ToolSet::invoke(name, args)
//!                       │  normalize_arguments   (Direct / kwargs-wrapped)
//!                       │  ToolGateway::call_tool
//!                       ▼  extract_text          (result.content[0].text)
//!                    flat String
//! ```
//!
//! ```rust,ignore
//! use taskbot_core::tools::ToolRegistry;
//!
//! let registry = ToolRegistry::new(gateway, logger);
//! let tools = registry.discover().await?;
//! let text = tools.invoke("describe_cluster", json!({"name": "prod"})).await?;
//! ```

mod arguments;
mod extract;
mod registry;

pub use arguments::{normalize_arguments, ArgumentShape, WRAPPER_KEY};
pub use extract::{extract_text, is_error_result, TEXT_POINTER};
pub use registry::{ToolRegistry, ToolSet};
