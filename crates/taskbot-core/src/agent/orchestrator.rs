//! Turn driver
//!
//! ```text
//! FETCH_TOOLS ──► MODEL_TURN ──► FINAL_RESPONSE
//!                   ▲     │
//!                   │     ▼
//!                  TOOL_CALL (sequential)
//! ```
//!
//! The tool set is discovered at the start of every turn and dropped at the
//! end of it. Any error aborts the turn and becomes the final message.

use std::sync::Arc;

use thiserror::Error;

use super::conversation::Conversation;
use super::output::{OutputSink, SinkError};
use crate::config::AgentConfig;
use crate::gateway::{GatewayError, ToolGateway};
use crate::logging::Logger;
use crate::{log_debug, log_error, log_info, log_warn};
use crate::model::{ChatModel, ModelError, ModelRequest};
use crate::session::{SessionError, SessionKey, SessionStore};
use crate::tools::{ToolRegistry, ToolSet};
use crate::types::{ChatMessage, ToolCall, ToolResult};

/// Errors that end a turn
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// The final answer could not be delivered
    #[error("Failed to deliver final response: {0}")]
    Output(#[source] SinkError),

    #[error("Session store error: {0}")]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Completed,
    /// The turn was aborted; the final text describes the failure
    Failed,
}

/// What a turn delivered
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The final message, sent exactly once
    pub text: String,
    pub status: TurnStatus,
    /// Tool calls dispatched during the turn, including rejected ones
    pub tool_calls: usize,
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == TurnStatus::Completed
    }
}

/// Final message for a turn that failed
pub fn failure_message(err: &AgentError) -> String {
    format!("Sorry, I couldn't finish that request: {}", err)
}

/// Drives conversational turns against a gateway and a model
pub struct Agent {
    registry: ToolRegistry,
    model: Arc<dyn ChatModel>,
    config: AgentConfig,
    sessions: Option<Arc<dyn SessionStore>>,
    logger: Arc<dyn Logger>,
}

impl Agent {
    pub fn new(
        gateway: Arc<dyn ToolGateway>,
        model: Arc<dyn ChatModel>,
        config: AgentConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            registry: ToolRegistry::new(gateway, logger.clone()),
            model,
            config,
            sessions: None,
            logger,
        }
    }

    /// Persist conversations between `handle_message` calls
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run one turn, reporting progress and the final answer through `sink`
    ///
    /// Progress notes are best effort. A failed turn still delivers a final
    /// message describing the failure and returns `TurnStatus::Failed`; only
    /// failing to deliver that final message is an error.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        message: &str,
        sink: &dyn OutputSink,
    ) -> Result<TurnOutcome, AgentError> {
        let mut tool_calls = 0;
        let (text, status) = match self.turn(conversation, message, Some(sink), &mut tool_calls).await {
            Ok(text) => (text, TurnStatus::Completed),
            Err(e) => (failure_message(&e), TurnStatus::Failed),
        };
        if status == TurnStatus::Failed {
            conversation.push(ChatMessage::assistant(text.clone()));
        }

        if let Err(e) = sink.send(&text).await {
            log_error!(self.logger, "[Agent] Failed to deliver final response: {}", e);
            return Err(AgentError::Output(e));
        }

        Ok(TurnOutcome {
            text,
            status,
            tool_calls,
        })
    }

    /// Run one turn and return the final answer instead of sending it
    pub async fn run_text(&self, conversation: &mut Conversation, message: &str) -> Result<String, AgentError> {
        let mut tool_calls = 0;
        match self.turn(conversation, message, None, &mut tool_calls).await {
            Ok(text) => Ok(text),
            Err(e) => {
                conversation.push(ChatMessage::assistant(failure_message(&e)));
                Err(e)
            }
        }
    }

    /// Load the session's history, run one turn, save the history
    pub async fn handle_message(
        &self,
        key: &SessionKey,
        message: &str,
        sink: &dyn OutputSink,
    ) -> Result<TurnOutcome, AgentError> {
        let Some(sessions) = &self.sessions else {
            return self.run(&mut Conversation::new(), message, sink).await;
        };

        let mut conversation = sessions.load(key).await?;
        log_debug!(
            self.logger,
            "[Agent] Loaded {} messages for session {} from {}",
            conversation.len(),
            key,
            sessions.name()
        );

        let outcome = self.run(&mut conversation, message, sink).await?;

        if let Err(e) = sessions.save(key, &conversation).await {
            log_error!(self.logger, "[Agent] Failed to save session {}: {}", key, e);
        }
        Ok(outcome)
    }

    /// On failure the conversation is rolled back to just after the user
    /// message, so it never ends with unanswered tool requests.
    async fn turn(
        &self,
        conversation: &mut Conversation,
        message: &str,
        sink: Option<&dyn OutputSink>,
        tool_calls: &mut usize,
    ) -> Result<String, AgentError> {
        conversation.push(ChatMessage::user(message));
        let checkpoint = conversation.len();

        let result = self.steps(conversation, sink, tool_calls).await;
        if let Err(e) = &result {
            log_error!(self.logger, "[Agent] Turn failed: {}", e);
            conversation.truncate(checkpoint);
        }
        result
    }

    async fn steps(
        &self,
        conversation: &mut Conversation,
        sink: Option<&dyn OutputSink>,
        tool_calls: &mut usize,
    ) -> Result<String, AgentError> {
        let tools = self.registry.discover().await?;
        let definitions = tools.definitions();

        loop {
            let request = ModelRequest::new(
                &self.config.model_id,
                &self.config.system_prompt,
                conversation.messages(),
                &definitions,
            );
            let reply = self.model.respond(request).await?;

            if reply.is_final() {
                let text = reply.text.unwrap_or_default();
                log_info!(self.logger, "[Agent] Turn completed after {} tool calls", tool_calls);
                conversation.push(ChatMessage::assistant(text.clone()));
                return Ok(text);
            }

            conversation.push(ChatMessage::assistant_tool_use(reply.text.as_deref(), &reply.tool_calls));
            if let (Some(sink), Some(note)) = (sink, reply.visible_text()) {
                self.notify(sink, note).await;
            }

            let mut results = Vec::with_capacity(reply.tool_calls.len());
            for call in &reply.tool_calls {
                *tool_calls += 1;
                results.push(self.call_tool(&tools, call).await?);
            }
            conversation.push(ChatMessage::tool_results(&results));
        }
    }

    async fn call_tool(&self, tools: &ToolSet, call: &ToolCall) -> Result<ToolResult, AgentError> {
        if !tools.contains(&call.name) {
            log_warn!(self.logger, "[Agent] Model requested unknown tool: {}", call.name);
            return Ok(ToolResult::error(
                call.id.clone(),
                GatewayError::UnknownTool(call.name.clone()).to_string(),
            ));
        }
        Ok(tools.execute(call).await?)
    }

    async fn notify(&self, sink: &dyn OutputSink, text: &str) {
        if let Err(e) = sink.send(text).await {
            log_warn!(self.logger, "[Agent] Progress notification dropped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::output::{BufferSink, FnSink};
    use crate::gateway::{GatewayResult, ToolDescriptor};
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::model::{ModelReply, ScriptedModel};
    use crate::session::MemorySessionStore;
    use crate::types::MessageRole;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGateway {
        tools: Vec<&'static str>,
        list_error: Option<u16>,
        call_error: Option<u16>,
        calls: Mutex<Vec<(String, Value)>>,
        lists: AtomicUsize,
    }

    impl FakeGateway {
        fn with_tools(tools: Vec<&'static str>) -> Self {
            Self {
                tools,
                list_error: None,
                call_error: None,
                calls: Mutex::new(Vec::new()),
                lists: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl ToolGateway for FakeGateway {
        async fn list_tools(&self) -> GatewayResult<Vec<ToolDescriptor>> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.list_error {
                return Err(GatewayError::transport(status, "tools/list"));
            }
            Ok(self
                .tools
                .iter()
                .map(|name| ToolDescriptor::new(*name, format!("{} tool", name), json!({"type": "object"})))
                .collect())
        }

        async fn call_tool(&self, name: &str, arguments: Value) -> GatewayResult<Value> {
            self.calls.lock().push((name.to_string(), arguments));
            if let Some(status) = self.call_error {
                return Err(GatewayError::transport(status, "tools/call"));
            }
            Ok(json!({"result": {"content": [{"type": "text", "text": format!("{} ok", name)}]}}))
        }
    }

    fn agent(gateway: Arc<FakeGateway>, model: Arc<ScriptedModel>) -> Agent {
        Agent::new(gateway, model, AgentConfig::default(), NoOpLogger::shared())
    }

    fn call(id: &str, name: &str, input: Value) -> ToolCall {
        ToolCall::new(id, name, input)
    }

    #[tokio::test]
    async fn test_direct_answer_without_tools() {
        let gateway = Arc::new(FakeGateway::with_tools(vec!["search"]));
        let model = Arc::new(ScriptedModel::fixed("Hi there!", NoOpLogger::shared()));
        let sink = BufferSink::new();
        let mut conversation = Conversation::new();

        let outcome = agent(gateway.clone(), model.clone())
            .run(&mut conversation, "hello", &sink)
            .await
            .unwrap();

        assert!(outcome.is_completed());
        assert_eq!(outcome.tool_calls, 0);
        assert_eq!(sink.messages(), vec!["Hi there!"]);
        assert_eq!(conversation.len(), 2);
        assert!(gateway.calls().is_empty());

        let requests = model.requests();
        assert_eq!(requests[0].tool_names, vec!["search"]);
        assert_eq!(requests[0].system_prompt, AgentConfig::default().system_prompt);
        assert_eq!(requests[0].model_id, crate::config::DEFAULT_MODEL_ID);
    }

    #[tokio::test]
    async fn test_configured_model_id_reaches_every_step() {
        let gateway = Arc::new(FakeGateway::with_tools(vec!["search"]));
        let model = Arc::new(ScriptedModel::new(
            vec![
                ModelReply::tool_calls(vec![call("c1", "search", json!({"query": "eks"}))]),
                ModelReply::text("found it"),
            ],
            NoOpLogger::shared(),
        ));
        let config = AgentConfig::default().with_model_id("amazon.nova-pro-v1:0");
        let agent = Agent::new(gateway, model.clone(), config, NoOpLogger::shared());

        agent.run_text(&mut Conversation::new(), "find eks").await.unwrap();

        let requests = model.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.model_id == "amazon.nova-pro-v1:0"));
    }

    #[tokio::test]
    async fn test_tools_run_sequentially_with_progress_notes() {
        let gateway = Arc::new(FakeGateway::with_tools(vec!["createTask", "notifySlack"]));
        let model = Arc::new(ScriptedModel::new(
            vec![
                ModelReply::tool_calls(vec![call("c1", "createTask", json!({"kwargs": "{\"title\":\"Deploy\"}"}))])
                    .with_text("Creating the task."),
                ModelReply::tool_calls(vec![call("c2", "notifySlack", json!({"channel": "#team-dev"}))])
                    .with_text("Task created! Notifying the channel."),
                ModelReply::text("Done, task created and #team-dev notified."),
            ],
            NoOpLogger::shared(),
        ));
        let sink = BufferSink::new();
        let mut conversation = Conversation::new();

        let outcome = agent(gateway.clone(), model.clone())
            .run(&mut conversation, "create a deploy task and tell #team-dev", &sink)
            .await
            .unwrap();

        assert_eq!(outcome.tool_calls, 2);
        assert_eq!(
            sink.messages(),
            vec![
                "Creating the task.",
                "Task created! Notifying the channel.",
                "Done, task created and #team-dev notified.",
            ]
        );
        assert_eq!(
            gateway.calls(),
            vec![
                ("createTask".to_string(), json!({"title": "Deploy"})),
                ("notifySlack".to_string(), json!({"channel": "#team-dev"})),
            ]
        );

        // user, (tool use, tool result) x2, final
        assert_eq!(conversation.len(), 6);
        let results: Vec<_> = conversation.messages()[2].tool_result_parts().collect();
        assert_eq!(results, vec![("c1", "createTask ok", false)]);

        // The second model step saw the first tool's result
        assert_eq!(model.requests()[1].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_tool_set_is_fetched_every_turn() {
        let gateway = Arc::new(FakeGateway::with_tools(vec!["search"]));
        let model = Arc::new(ScriptedModel::new(
            vec![ModelReply::text("one"), ModelReply::text("two")],
            NoOpLogger::shared(),
        ));
        let agent = agent(gateway.clone(), model);
        let mut conversation = Conversation::new();

        assert_eq!(agent.run_text(&mut conversation, "first").await.unwrap(), "one");
        assert_eq!(agent.run_text(&mut conversation, "second").await.unwrap(), "two");
        assert_eq!(gateway.lists.load(Ordering::SeqCst), 2);
        assert_eq!(conversation.len(), 4);
    }

    #[tokio::test]
    async fn test_discovery_failure_ends_turn_with_error_message() {
        let gateway = Arc::new(FakeGateway {
            list_error: Some(503),
            ..FakeGateway::with_tools(vec![])
        });
        let model = Arc::new(ScriptedModel::fixed("unused", NoOpLogger::shared()));
        let sink = BufferSink::new();
        let mut conversation = Conversation::new();

        let outcome = agent(gateway, model.clone())
            .run(&mut conversation, "status?", &sink)
            .await
            .unwrap();

        assert_eq!(outcome.status, TurnStatus::Failed);
        assert_eq!(sink.len(), 1);
        assert!(outcome.text.contains("HTTP 503"));
        assert!(model.requests().is_empty());
        assert_eq!(conversation.last_assistant_text(), Some(outcome.text.as_str()));
    }

    #[tokio::test]
    async fn test_failed_turn_is_logged_as_error() {
        let gateway = Arc::new(FakeGateway {
            list_error: Some(503),
            ..FakeGateway::with_tools(vec![])
        });
        let model = Arc::new(ScriptedModel::fixed("unused", NoOpLogger::shared()));
        let logger = Arc::new(MemoryLogger::new());
        let agent = Agent::new(gateway, model, AgentConfig::default(), logger.clone());

        agent.run(&mut Conversation::new(), "status?", &BufferSink::new()).await.unwrap();

        let errors = logger.messages_at(LogLevel::Error);
        assert!(errors.iter().any(|m| m.starts_with("[Agent] Turn failed") && m.contains("HTTP 503")));
    }

    #[tokio::test]
    async fn test_tool_failure_keeps_earlier_notes_and_rolls_back_history() {
        let gateway = Arc::new(FakeGateway {
            call_error: Some(502),
            ..FakeGateway::with_tools(vec!["describe_cluster"])
        });
        let model = Arc::new(ScriptedModel::new(
            vec![ModelReply::tool_calls(vec![call("c1", "describe_cluster", json!({"name": "a"}))])
                .with_text("Checking cluster a.")],
            NoOpLogger::shared(),
        ));
        let sink = BufferSink::new();
        let mut conversation = Conversation::new();

        let outcome = agent(gateway, model)
            .run(&mut conversation, "describe a", &sink)
            .await
            .unwrap();

        assert_eq!(outcome.status, TurnStatus::Failed);
        assert_eq!(outcome.tool_calls, 1);
        let sent = sink.messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], "Checking cluster a.");
        assert!(sent[1].contains("HTTP 502"));

        // user message, then the failure; no dangling tool use
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[0].role, MessageRole::User);
        assert_eq!(conversation.messages()[1].text(), Some(sent[1].as_str()));
    }

    #[tokio::test]
    async fn test_run_text_returns_the_error() {
        let gateway = Arc::new(FakeGateway::with_tools(vec![]));
        let model = Arc::new(ScriptedModel::new(vec![], NoOpLogger::shared()));
        model.push_error(ModelError::api(500, "internal"));

        let err = agent(gateway, model)
            .run_text(&mut Conversation::new(), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Model(ModelError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fed_back_to_model() {
        let gateway = Arc::new(FakeGateway::with_tools(vec!["search"]));
        let model = Arc::new(ScriptedModel::new(
            vec![
                ModelReply::tool_calls(vec![call("c1", "delete_everything", json!({}))]),
                ModelReply::text("That tool isn't available."),
            ],
            NoOpLogger::shared(),
        ));
        let logger = Arc::new(MemoryLogger::new());
        let agent = Agent::new(gateway.clone(), model, AgentConfig::default(), logger.clone());
        let mut conversation = Conversation::new();

        let text = agent.run_text(&mut conversation, "wipe it").await.unwrap();

        assert_eq!(text, "That tool isn't available.");
        assert!(gateway.calls().is_empty());
        let results: Vec<_> = conversation.messages()[2].tool_result_parts().collect();
        assert_eq!(results, vec![("c1", "Unknown tool: delete_everything", true)]);
        assert_eq!(logger.messages_at(LogLevel::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_progress_failure_is_not_fatal_but_final_failure_is() {
        let gateway = Arc::new(FakeGateway::with_tools(vec!["list_clusters"]));
        let script = || {
            vec![
                ModelReply::tool_calls(vec![call("c1", "list_clusters", json!({}))]).with_text("Looking."),
                ModelReply::text("Two clusters."),
            ]
        };

        let sent = AtomicUsize::new(0);
        let flaky_progress = FnSink::new(|text: &str| {
            sent.fetch_add(1, Ordering::SeqCst);
            if text == "Looking." {
                Err(SinkError::Delivery("rate limited".into()))
            } else {
                Ok(())
            }
        });
        let model = Arc::new(ScriptedModel::new(script(), NoOpLogger::shared()));
        let outcome = agent(gateway.clone(), model)
            .run(&mut Conversation::new(), "clusters?", &flaky_progress)
            .await
            .unwrap();
        assert!(outcome.is_completed());
        assert_eq!(sent.load(Ordering::SeqCst), 2);

        let closed = FnSink::new(|text: &str| {
            if text == "Two clusters." {
                Err(SinkError::Closed)
            } else {
                Ok(())
            }
        });
        let model = Arc::new(ScriptedModel::new(script(), NoOpLogger::shared()));
        let err = agent(gateway, model)
            .run(&mut Conversation::new(), "clusters?", &closed)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Output(SinkError::Closed)));
    }

    #[tokio::test]
    async fn test_handle_message_persists_history() {
        let gateway = Arc::new(FakeGateway::with_tools(vec![]));
        let model = Arc::new(ScriptedModel::new(
            vec![ModelReply::text("first answer"), ModelReply::text("second answer")],
            NoOpLogger::shared(),
        ));
        let sessions = Arc::new(MemorySessionStore::new());
        let agent = agent(gateway, model.clone()).with_sessions(sessions.clone());
        let key = SessionKey::new("U123", "1712345678.000100");
        let sink = BufferSink::new();

        agent.handle_message(&key, "one", &sink).await.unwrap();
        agent.handle_message(&key, "two", &sink).await.unwrap();

        assert_eq!(sink.messages(), vec!["first answer", "second answer"]);
        // Second turn saw the first turn's exchange
        assert_eq!(model.requests()[1].messages.len(), 3);
        let stored = sessions.load(&key).await.unwrap();
        assert_eq!(stored.len(), 4);
    }
}
