//! Gateway client over HTTP JSON-RPC
//!
//! Every request carries a bearer token from the `TokenManager`. Response
//! bodies are handed back as opaque JSON; reading the tool result out of
//! them is the tool adapter's job.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::error::{GatewayError, GatewayResult};
use super::protocol::{JsonRpcRequest, ToolDescriptor, ToolsPage, METHOD_TOOLS_LIST};
use crate::auth::TokenManager;
use crate::config::{GatewayConfig, Timeouts};
use crate::logging::Logger;

/// Upper bound on `tools/list` pages fetched for one inventory
pub const MAX_LIST_PAGES: usize = 100;

/// Remote tool inventory and invocation
///
/// `GatewayClient` is the production implementation; the seam exists so the
/// tool adapter and the orchestrator can run against in-process fakes.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Every tool the gateway currently exposes
    async fn list_tools(&self) -> GatewayResult<Vec<ToolDescriptor>>;

    /// Invoke `name` and return the raw JSON-RPC response body
    async fn call_tool(&self, name: &str, arguments: Value) -> GatewayResult<Value>;
}

/// Client for one gateway endpoint
pub struct GatewayClient {
    url: String,
    http: reqwest::Client,
    tokens: Arc<TokenManager>,
    timeouts: Timeouts,
    logger: Arc<dyn Logger>,
}

impl GatewayClient {
    /// Build a client and its token manager from resolved configuration
    pub fn new(config: GatewayConfig, logger: Arc<dyn Logger>) -> Self {
        let http = reqwest::Client::new();
        let tokens = Arc::new(TokenManager::with_client(
            config.credential,
            http.clone(),
            config.timeouts.token,
            logger.clone(),
        ));

        Self {
            url: config.url,
            http,
            tokens,
            timeouts: config.timeouts,
            logger,
        }
    }

    /// Build a client around an existing token manager
    pub fn with_token_manager(
        url: impl Into<String>,
        tokens: Arc<TokenManager>,
        timeouts: Timeouts,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
            tokens,
            timeouts,
            logger,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// One raw `tools/list` page
    pub async fn list_tools_page(&self, cursor: Option<&str>) -> GatewayResult<Value> {
        self.send(&JsonRpcRequest::tools_list(cursor), self.timeouts.list)
            .await
    }

    async fn send(&self, request: &JsonRpcRequest, timeout: Duration) -> GatewayResult<Value> {
        let method = request.method;
        let token = self.tokens.get_token().await?;

        self.logger.debug(&format!("[GatewayClient] POST {} method={}", self.url, method));

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(token)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, method, timeout))?;

        let status = response.status();
        if !status.is_success() {
            self.logger.error(&format!(
                "[GatewayClient] {} failed with HTTP {}",
                method, status
            ));
            return Err(GatewayError::transport(status.as_u16(), method));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, method, timeout))
    }
}

#[async_trait]
impl ToolGateway for GatewayClient {
    async fn list_tools(&self) -> GatewayResult<Vec<ToolDescriptor>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        for fetched in 1..=MAX_LIST_PAGES {
            let body = self.list_tools_page(cursor.as_deref()).await?;
            let page = ToolsPage::parse(&body, self.logger.as_ref())?;
            tools.extend(page.tools);

            match page.next_cursor {
                Some(_) if fetched == MAX_LIST_PAGES => {
                    self.logger.warn(&format!(
                        "[GatewayClient] {} still paginating after {} pages, keeping {} tools",
                        METHOD_TOOLS_LIST,
                        MAX_LIST_PAGES,
                        tools.len()
                    ));
                }
                Some(next) if seen.insert(next.clone()) => cursor = Some(next),
                Some(next) => {
                    self.logger.warn(&format!(
                        "[GatewayClient] {} repeated cursor {:?}, stopping pagination",
                        METHOD_TOOLS_LIST, next
                    ));
                    break;
                }
                None => break,
            }
        }

        self.logger.info(&format!("[GatewayClient] Listed {} tools", tools.len()));
        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> GatewayResult<Value> {
        self.logger.info(&format!("[GatewayClient] Calling tool: {}", name));
        self.send(&JsonRpcRequest::tools_call(name, arguments), self.timeouts.call)
            .await
    }
}
