//! Result extraction from `tools/call` responses

use serde_json::Value;

/// Location of the text payload in a successful response
pub const TEXT_POINTER: &str = "/result/content/0/text";

/// Flat text of a `tools/call` response
///
/// Reads `result.content[0].text`. When that path is missing or not a
/// string, the whole response is rendered as JSON instead; envelope drift
/// must not block the caller.
pub fn extract_text(response: &Value) -> String {
    match response.pointer(TEXT_POINTER).and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => response.to_string(),
    }
}

/// Whether the remote tool flagged its own result as an error
pub fn is_error_result(response: &Value) -> bool {
    response
        .pointer("/result/isError")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
