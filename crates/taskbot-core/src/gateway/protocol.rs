//! JSON-RPC 2.0 envelopes for the gateway's MCP methods

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::{GatewayError, GatewayResult};
use crate::logging::Logger;
use crate::types::Tool;

pub const JSONRPC_VERSION: &str = "2.0";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// Every request is a standalone HTTP exchange, so the id never varies
pub const REQUEST_ID: u64 = 1;

/// Outgoing JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// `tools/list`, with a cursor only when following a page
    pub fn tools_list(cursor: Option<&str>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: REQUEST_ID,
            method: METHOD_TOOLS_LIST,
            params: cursor.map(|c| json!({ "cursor": c })),
        }
    }

    /// `tools/call` with the arguments forwarded as given
    pub fn tools_call(name: &str, arguments: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: REQUEST_ID,
            method: METHOD_TOOLS_CALL,
            params: Some(json!({ "name": name, "arguments": arguments })),
        }
    }
}

/// Remote description of one callable tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Lookup key used at call time
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Lenient conversion of one `result.tools[]` entry
    ///
    /// Only a string `name` is required.
    pub fn from_value(value: &Value) -> Option<Self> {
        let name = value.get("name")?.as_str()?;
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let input_schema = match value.get("inputSchema") {
            Some(schema) if !schema.is_null() => schema.clone(),
            _ => Value::Object(Map::new()),
        };
        Some(Self::new(name, description, input_schema))
    }
}

impl From<&ToolDescriptor> for Tool {
    fn from(descriptor: &ToolDescriptor) -> Self {
        Tool::new(&descriptor.name, &descriptor.description)
            .with_schema(descriptor.input_schema.clone())
    }
}

/// One page of a `tools/list` response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolsPage {
    pub tools: Vec<ToolDescriptor>,
    pub next_cursor: Option<String>,
}

impl ToolsPage {
    /// Read `result.tools` and `result.nextCursor` out of a response body
    ///
    /// A body with an `error` member and no `result` is a JSON-RPC failure.
    /// Anything else missing degrades to an empty page.
    pub fn parse(body: &Value, logger: &dyn Logger) -> GatewayResult<Self> {
        if body.get("result").is_none() {
            if let Some(error) = body.get("error") {
                return Err(GatewayError::Rpc {
                    code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                    message: error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string(),
                });
            }
        }

        let result = body.get("result");
        let entries = result
            .and_then(|r| r.get("tools"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut tools = Vec::with_capacity(entries.len());
        for entry in entries {
            match ToolDescriptor::from_value(entry) {
                Some(descriptor) => tools.push(descriptor),
                None => logger.warn(&format!(
                    "[GatewayClient] Skipping tool entry without a name: {}",
                    entry
                )),
            }
        }

        let next_cursor = result
            .and_then(|r| r.get("nextCursor"))
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Self { tools, next_cursor })
    }
}
