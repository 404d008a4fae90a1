//! Argument normalization
//!
//! Model runtimes do not always call a tool with the descriptor's parameters
//! literally. Some wrap everything under a single `kwargs` key, holding
//! either JSON text, a structured value, or nothing at all.

use serde_json::{Map, Value};

use crate::gateway::{GatewayError, GatewayResult};

/// Key some runtimes wrap the real arguments in
pub const WRAPPER_KEY: &str = "kwargs";

/// How the caller shaped its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentShape {
    /// Argument mapping as declared by the descriptor
    Direct(Value),
    /// Wrapper holding JSON text
    WrappedJson(String),
    /// Wrapper holding an empty or absent value
    WrappedEmpty,
    /// Wrapper holding an already structured value
    WrappedValue(Value),
}

impl ArgumentShape {
    /// Decide the shape of a raw argument value
    pub fn classify(input: Value) -> Self {
        match input {
            Value::Object(map) if map.len() == 1 && map.contains_key(WRAPPER_KEY) => {
                let inner = map.into_iter().next().map_or(Value::Null, |(_, v)| v);
                Self::classify_wrapped(inner)
            }
            Value::Null => Self::Direct(Value::Object(Map::new())),
            other => Self::Direct(other),
        }
    }

    fn classify_wrapped(inner: Value) -> Self {
        if is_empty(&inner) {
            return Self::WrappedEmpty;
        }
        match inner {
            Value::String(text) => Self::WrappedJson(text),
            other => Self::WrappedValue(other),
        }
    }

    /// Produce the argument value forwarded to the gateway
    ///
    /// Only `WrappedJson` can fail: the text must parse as a JSON object.
    pub fn into_arguments(self, tool: &str) -> GatewayResult<Value> {
        match self {
            Self::Direct(value) | Self::WrappedValue(value) => Ok(value),
            Self::WrappedEmpty => Ok(Value::Object(Map::new())),
            Self::WrappedJson(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(value @ Value::Object(_)) => Ok(value),
                Ok(other) => Err(GatewayError::ArgumentDecode {
                    tool: tool.to_string(),
                    reason: format!("expected a JSON object, got {}", kind(&other)),
                    raw,
                }),
                Err(e) => Err(GatewayError::ArgumentDecode {
                    tool: tool.to_string(),
                    reason: e.to_string(),
                    raw,
                }),
            },
        }
    }
}

/// Classify and unwrap in one step
pub fn normalize_arguments(tool: &str, input: Value) -> GatewayResult<Value> {
    ArgumentShape::classify(input).into_arguments(tool)
}

/// Values a wrapper treats as "no arguments"
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
