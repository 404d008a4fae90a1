//! Tool registry: discovery and dispatch by name
//!
//! The registry fetches the remote inventory and freezes it into a
//! `ToolSet` for one conversational turn. A `ToolSet` is a name-keyed map of
//! descriptors plus one generic `invoke`, not one callable per tool.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::arguments::normalize_arguments;
use super::extract::{extract_text, is_error_result};
use crate::gateway::{GatewayError, GatewayResult, ToolDescriptor, ToolGateway};
use crate::logging::Logger;
use crate::types::{Tool, ToolCall, ToolResult};

/// Discovers tools from a gateway
pub struct ToolRegistry {
    gateway: Arc<dyn ToolGateway>,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    pub fn new(gateway: Arc<dyn ToolGateway>, logger: Arc<dyn Logger>) -> Self {
        Self { gateway, logger }
    }

    /// Fetch the current inventory
    ///
    /// Called once per turn; nothing is cached between calls so remote
    /// availability changes show up on the next turn.
    pub async fn discover(&self) -> GatewayResult<ToolSet> {
        self.logger.info("[ToolRegistry] Fetching tools from gateway");

        let descriptors = match self.gateway.list_tools().await {
            Ok(descriptors) => descriptors,
            Err(e) => {
                self.logger.error(&format!("[ToolRegistry] Failed to fetch tools: {}", e));
                return Err(e);
            }
        };

        let set = ToolSet::from_descriptors(descriptors, self.gateway.clone(), self.logger.clone());
        self.logger.info(&format!(
            "[ToolRegistry] Found {} tools: {:?}",
            set.len(),
            set.names().collect::<Vec<_>>()
        ));
        Ok(set)
    }
}

/// Tools available to one turn
pub struct ToolSet {
    /// Descriptors in first-seen order
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
    gateway: Arc<dyn ToolGateway>,
    logger: Arc<dyn Logger>,
}

impl ToolSet {
    /// Build from a descriptor list
    ///
    /// Duplicate names keep the position of their first occurrence and the
    /// contents of their last.
    pub fn from_descriptors(
        descriptors: Vec<ToolDescriptor>,
        gateway: Arc<dyn ToolGateway>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let mut unique: Vec<ToolDescriptor> = Vec::with_capacity(descriptors.len());
        let mut index = HashMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            match index.get(&descriptor.name) {
                Some(&slot) => {
                    logger.warn(&format!(
                        "[ToolRegistry] Duplicate tool name {:?}, keeping the last descriptor",
                        descriptor.name
                    ));
                    unique[slot] = descriptor;
                }
                None => {
                    index.insert(descriptor.name.clone(), unique.len());
                    unique.push(descriptor);
                }
            }
        }

        Self {
            descriptors: unique,
            index,
            gateway,
            logger,
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    /// Tool definitions for the model, one per name
    pub fn definitions(&self) -> Vec<Tool> {
        self.descriptors.iter().map(Tool::from).collect()
    }

    /// Invoke a tool by name and return its flat text result
    ///
    /// Failures are logged with the tool name and arguments, then returned
    /// unchanged.
    pub async fn invoke(&self, name: &str, arguments: Value) -> GatewayResult<String> {
        if !self.contains(name) {
            return Err(GatewayError::UnknownTool(name.to_string()));
        }

        self.logger.info(&format!(
            "[ToolRegistry] Calling gateway tool {} with args: {}",
            name, arguments
        ));

        let response = match self.dispatch(name, arguments.clone()).await {
            Ok(response) => response,
            Err(e) => {
                self.logger.error(&format!(
                    "[ToolRegistry] Gateway tool {} failed with args {}: {}",
                    name, arguments, e
                ));
                return Err(e);
            }
        };

        if is_error_result(&response) {
            self.logger.warn(&format!("[ToolRegistry] Gateway tool {} reported an error result", name));
        }
        self.logger.debug(&format!("[ToolRegistry] Gateway tool {} result: {}", name, response));

        Ok(extract_text(&response))
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> GatewayResult<Value> {
        let arguments = normalize_arguments(name, arguments)?;
        self.gateway.call_tool(name, arguments).await
    }

    /// Execute a tool call from a model reply
    pub async fn execute(&self, call: &ToolCall) -> GatewayResult<ToolResult> {
        let text = self.invoke(&call.name, call.input.clone()).await?;
        Ok(ToolResult::success(call.id.clone(), text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};

    /// Gateway double that records every call
    struct RecordingGateway {
        descriptors: Vec<ToolDescriptor>,
        response: Value,
        fail_calls: bool,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingGateway {
        fn new(descriptors: Vec<ToolDescriptor>, response: Value) -> Self {
            Self {
                descriptors,
                response,
                fail_calls: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(descriptors: Vec<ToolDescriptor>) -> Self {
            Self {
                fail_calls: true,
                ..Self::new(descriptors, Value::Null)
            }
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl ToolGateway for RecordingGateway {
        async fn list_tools(&self) -> GatewayResult<Vec<ToolDescriptor>> {
            Ok(self.descriptors.clone())
        }

        async fn call_tool(&self, name: &str, arguments: Value) -> GatewayResult<Value> {
            self.calls.lock().push((name.to_string(), arguments));
            if self.fail_calls {
                return Err(GatewayError::transport(502, "tools/call"));
            }
            Ok(self.response.clone())
        }
    }

    fn descriptor(name: &str, description: &str) -> ToolDescriptor {
        ToolDescriptor::new(name, description, json!({"type": "object"}))
    }

    fn ok_response(text: &str) -> Value {
        json!({"jsonrpc": "2.0", "id": 1, "result": {"content": [{"type": "text", "text": text}]}})
    }

    async fn discover(gateway: Arc<RecordingGateway>, logger: Arc<dyn Logger>) -> ToolSet {
        ToolRegistry::new(gateway, logger).discover().await.unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_names_last_write_wins() {
        let gateway = Arc::new(RecordingGateway::new(
            vec![
                descriptor("search", "old search"),
                descriptor("createTask", "create"),
                descriptor("search", "new search"),
            ],
            ok_response("ok"),
        ));
        let logger = Arc::new(MemoryLogger::new());
        let set = discover(gateway, logger.clone()).await;

        assert_eq!(set.len(), 2);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["search", "createTask"]);
        assert_eq!(set.get("search").unwrap().description, "new search");
        assert_eq!(set.definitions().len(), 2);
        assert_eq!(logger.messages_at(LogLevel::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_direct_arguments_forwarded_unchanged() {
        let gateway = Arc::new(RecordingGateway::new(
            vec![descriptor("describe_cluster", "Describe")],
            ok_response("ACTIVE"),
        ));
        let set = discover(gateway.clone(), Arc::new(NoOpLogger)).await;

        let args = json!({"name": "a", "include": ["nodegroups"]});
        let text = set.invoke("describe_cluster", args.clone()).await.unwrap();

        assert_eq!(text, "ACTIVE");
        assert_eq!(gateway.calls(), vec![("describe_cluster".to_string(), args)]);
    }

    #[tokio::test]
    async fn test_wrapped_arguments_are_unwrapped() {
        let gateway = Arc::new(RecordingGateway::new(
            vec![descriptor("createTask", "Create")],
            ok_response("created"),
        ));
        let set = discover(gateway.clone(), Arc::new(NoOpLogger)).await;

        set.invoke("createTask", json!({"kwargs": "{\"x\":1}"})).await.unwrap();
        set.invoke("createTask", json!({"kwargs": ""})).await.unwrap();
        set.invoke("createTask", json!({"kwargs": {}})).await.unwrap();

        let forwarded: Vec<Value> = gateway.calls().into_iter().map(|(_, a)| a).collect();
        assert_eq!(forwarded, vec![json!({"x": 1}), json!({}), json!({})]);
    }

    #[tokio::test]
    async fn test_decode_failure_is_logged_and_not_dispatched() {
        let gateway = Arc::new(RecordingGateway::new(vec![descriptor("createTask", "Create")], ok_response("x")));
        let logger = Arc::new(MemoryLogger::new());
        let set = discover(gateway.clone(), logger.clone()).await;

        let err = set.invoke("createTask", json!({"kwargs": "not json"})).await.unwrap_err();

        assert!(matches!(err, GatewayError::ArgumentDecode { .. }));
        assert!(gateway.calls().is_empty());
        let errors = logger.messages_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("createTask"));
        assert!(errors[0].contains("not json"));
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates_unchanged() {
        let gateway = Arc::new(RecordingGateway::failing(vec![descriptor("search", "Search")]));
        let logger = Arc::new(MemoryLogger::new());
        let set = discover(gateway, logger.clone()).await;

        let err = set.invoke("search", json!({"query": "rust"})).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport { status: 502, .. }));
        assert!(logger.contains("\"query\":\"rust\""));
    }

    #[tokio::test]
    async fn test_envelope_drift_falls_back_to_raw_text() {
        let gateway = Arc::new(RecordingGateway::new(
            vec![descriptor("list_clusters", "List")],
            json!({"result": {}}),
        ));
        let set = discover(gateway, Arc::new(NoOpLogger)).await;

        let text = set.invoke("list_clusters", json!({})).await.unwrap();
        assert_eq!(text, r#"{"result":{}}"#);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_rejected_locally() {
        let gateway = Arc::new(RecordingGateway::new(vec![], ok_response("x")));
        let set = discover(gateway.clone(), Arc::new(NoOpLogger)).await;

        let err = set.invoke("missing", json!({})).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnknownTool(ref n) if n == "missing"));
        assert!(gateway.calls().is_empty());
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_execute_wraps_result_with_call_id() {
        let gateway = Arc::new(RecordingGateway::new(vec![descriptor("search", "Search")], ok_response("found")));
        let set = discover(gateway, Arc::new(NoOpLogger)).await;

        let result = set
            .execute(&ToolCall::new("call-7", "search", json!({"query": "eks"})))
            .await
            .unwrap();
        assert_eq!(result, ToolResult::success("call-7", "found"));
    }
}
