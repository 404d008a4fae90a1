//! Remote tool gateway
//!
//! The gateway is an MCP-style JSON-RPC 2.0 endpoint behind OAuth2. Two
//! methods are used:
//!
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"tools/list"}
//! {"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":...,"arguments":...}}
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use taskbot_core::config::GatewayConfig;
//! use taskbot_core::gateway::{GatewayClient, ToolGateway};
//!
//! let client = GatewayClient::new(GatewayConfig::from_env()?, logger);
//! let tools = client.list_tools().await?;
//! let raw = client.call_tool("list_clusters", json!({})).await?;
//! ```

mod client;
mod error;
mod protocol;

pub use client::{GatewayClient, ToolGateway, MAX_LIST_PAGES};
pub use error::{GatewayError, GatewayResult};
pub use protocol::{
    JsonRpcRequest, ToolDescriptor, ToolsPage,
    JSONRPC_VERSION, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, REQUEST_ID,
};
