//! MCP server facade.
//!
//! Holds the declared capabilities, the tool registry, and the handler
//! tables shared by every session. Built once at startup via the builder;
//! immutable afterwards except for the tool registry and the minimum
//! logging level.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::mcp::exchange::Exchange;
use crate::mcp::handler::{NotificationHandler, RequestHandler, ToolHandler};
use crate::mcp::protocol::{
    CallToolParams, CallToolResult, Implementation, ListToolsResult, LoggingLevel, Message,
    ServerCapabilities, Tool, LATEST_PROTOCOL_VERSION, METHOD_LOGGING_SET_LEVEL,
    METHOD_NOTIFICATION_INITIALIZED, METHOD_NOTIFICATION_TOOLS_LIST_CHANGED, METHOD_PING,
    METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
};
use crate::mcp::session::{InitSettings, McpSession, SessionHandlers, SessionRegistry};
use crate::metrics::Metrics;
use crate::pipeline::{PipelineClient, PipelineToolDef};

/// A registered tool: its definition plus the handler backing it.
#[derive(Clone)]
pub struct ToolSpecification {
    pub tool: Tool,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolSpecification {
    pub fn new(tool: Tool, handler: Arc<dyn ToolHandler>) -> Self {
        Self { tool, handler }
    }
}

/// The MCP server.
pub struct McpServer {
    handlers: Arc<SessionHandlers>,
    capabilities: ServerCapabilities,
    server_info: Implementation,
    tools: RwLock<Vec<ToolSpecification>>,
    registry: Arc<SessionRegistry>,
    min_logging_level: Arc<RwLock<LoggingLevel>>,
    metrics: Arc<Metrics>,
}

impl McpServer {
    /// Start building a server.
    pub fn builder() -> McpServerBuilder {
        McpServerBuilder::new()
    }

    /// The session factory: create a session bound to `sink`, sharing this
    /// server's handler tables.
    pub fn create_session(
        &self,
        session_id: String,
        sink: mpsc::UnboundedSender<Message>,
    ) -> Arc<McpSession> {
        McpSession::new(
            session_id,
            sink,
            self.handlers.clone(),
            self.metrics.clone(),
        )
    }

    /// The registry of live sessions.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.registry.clone()
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    pub fn server_info(&self) -> &Implementation {
        &self.server_info
    }

    /// Current minimum logging level.
    pub async fn min_logging_level(&self) -> LoggingLevel {
        *self.min_logging_level.read().await
    }

    /// Snapshot of the registered tool definitions.
    pub async fn tools(&self) -> Vec<Tool> {
        self.tools.read().await.iter().map(|s| s.tool.clone()).collect()
    }

    /// Register a tool.
    ///
    /// Fails without side effects when the name is already taken or the
    /// server declared no tools capability. On success, a
    /// `tools/list_changed` notification is broadcast to every session if
    /// the capability was declared with `listChanged`.
    pub async fn add_tool(&self, spec: ToolSpecification) -> Result<()> {
        if self.capabilities.tools.is_none() {
            return Err(Error::McpProtocol(
                "Server must be configured with tool capabilities".to_string(),
            ));
        }

        {
            let mut tools = self.tools.write().await;
            if tools.iter().any(|s| s.tool.name == spec.tool.name) {
                return Err(Error::DuplicateTool(spec.tool.name.clone()));
            }
            debug!("Added tool handler: {}", spec.tool.name);
            tools.push(spec);
        }

        // The broadcast goes out only after the add is visible.
        if self.capabilities.tools_list_changed() {
            self.notify_tools_list_changed();
        }
        Ok(())
    }

    /// Broadcast a `tools/list_changed` notification to every session.
    pub fn notify_tools_list_changed(&self) {
        self.registry
            .notify_all(METHOD_NOTIFICATION_TOOLS_LIST_CHANGED, None);
    }
}

/// Builder for [`McpServer`].
pub struct McpServerBuilder {
    server_info: Implementation,
    capabilities: ServerCapabilities,
    protocol_versions: Vec<String>,
    instructions: Option<String>,
    pipeline: Option<Arc<PipelineClient>>,
    tools: Vec<ToolSpecification>,
}

impl McpServerBuilder {
    fn new() -> Self {
        Self {
            server_info: Implementation {
                name: "mcp-server".to_string(),
                version: "1.0.0".to_string(),
            },
            capabilities: ServerCapabilities::default(),
            protocol_versions: vec![LATEST_PROTOCOL_VERSION.to_string()],
            instructions: None,
            pipeline: None,
            tools: Vec::new(),
        }
    }

    /// Set the server identity reported during initialize.
    pub fn server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.server_info = Implementation {
            name: name.into(),
            version: version.into(),
        };
        self
    }

    /// Declare the server capabilities.
    pub fn capabilities(mut self, capabilities: ServerCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the supported protocol versions, ordered oldest to newest.
    pub fn protocol_versions(mut self, versions: Vec<String>) -> Self {
        self.protocol_versions = versions;
        self
    }

    /// Set the instructions string returned from initialize.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set the upstream pipeline client backing the tool handlers.
    pub fn pipeline(mut self, pipeline: Arc<PipelineClient>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Register an initial tool.
    pub fn tool(mut self, spec: ToolSpecification) -> Self {
        self.tools.push(spec);
        self
    }

    /// Build the server and install the built-in handlers.
    pub fn build(self) -> Result<Arc<McpServer>> {
        info!(
            "Creating MCP server {} v{}",
            self.server_info.name, self.server_info.version
        );

        let metrics = Metrics::new();
        let registry = SessionRegistry::new(metrics.clone());
        let min_logging_level = Arc::new(RwLock::new(LoggingLevel::default()));

        let mut requests: HashMap<String, Arc<dyn RequestHandler>> = HashMap::new();

        // Ping must respond with an empty object, never null.
        requests.insert(METHOD_PING.to_string(), Arc::new(PingHandler));

        if self.capabilities.tools.is_some() {
            let pipeline = self.pipeline.clone().ok_or_else(|| {
                Error::Config(
                    "tools capability requires a pipeline client".to_string(),
                )
            })?;
            requests.insert(
                METHOD_TOOLS_LIST.to_string(),
                Arc::new(ListToolsHandler {
                    pipeline: pipeline.clone(),
                }),
            );
            requests.insert(
                METHOD_TOOLS_CALL.to_string(),
                Arc::new(CallToolHandler {
                    pipeline,
                    metrics: metrics.clone(),
                }),
            );
        }

        if self.capabilities.logging.is_some() {
            requests.insert(
                METHOD_LOGGING_SET_LEVEL.to_string(),
                Arc::new(SetLevelHandler {
                    level: min_logging_level.clone(),
                }),
            );
        }

        let mut notifications: HashMap<String, Arc<dyn NotificationHandler>> = HashMap::new();
        notifications.insert(
            METHOD_NOTIFICATION_INITIALIZED.to_string(),
            Arc::new(InitializedHandler),
        );

        let handlers = Arc::new(SessionHandlers {
            init: InitSettings {
                server_info: self.server_info.clone(),
                capabilities: self.capabilities.clone(),
                protocol_versions: self.protocol_versions,
                instructions: self.instructions,
            },
            requests,
            notifications,
        });

        Ok(Arc::new(McpServer {
            handlers,
            capabilities: self.capabilities,
            server_info: self.server_info,
            tools: RwLock::new(self.tools),
            registry,
            min_logging_level,
            metrics,
        }))
    }
}

// ===== Built-in Handlers =====

struct PingHandler;

#[async_trait]
impl RequestHandler for PingHandler {
    async fn handle(&self, _exchange: Exchange, _params: Option<Value>) -> Result<Value> {
        Ok(json!({}))
    }
}

/// `tools/list`, sourced from the upstream pipeline: the incoming params go
/// out as the request body, and the pipeline's `[0].tools` comes back as
/// the tool registry.
struct ListToolsHandler {
    pipeline: Arc<PipelineClient>,
}

#[async_trait]
impl RequestHandler for ListToolsHandler {
    async fn handle(&self, _exchange: Exchange, params: Option<Value>) -> Result<Value> {
        let body = self
            .pipeline
            .invoke(&params.unwrap_or_else(|| json!({})))
            .await?;

        let response: Value = serde_json::from_str(&body)
            .map_err(|e| Error::McpProtocol(format!("Invalid pipeline response: {}", e)))?;

        let defs = response
            .get(0)
            .and_then(|first| first.get("tools"))
            .cloned()
            .ok_or_else(|| {
                Error::McpProtocol("Pipeline response carries no tool list".to_string())
            })?;

        let defs: Vec<PipelineToolDef> = serde_json::from_value(defs)
            .map_err(|e| Error::McpProtocol(format!("Invalid tool definition: {}", e)))?;

        let tools: Vec<Tool> = defs.into_iter().map(PipelineToolDef::into_tool).collect();
        debug!("Pipeline reported {} tools", tools.len());

        Ok(serde_json::to_value(ListToolsResult {
            tools,
            next_cursor: None,
        })?)
    }
}

/// `tools/call`: the arguments, augmented with `sl_tool_name`, go to the
/// pipeline; its first response element comes back verbatim as one text
/// content entry.
struct CallToolHandler {
    pipeline: Arc<PipelineClient>,
    metrics: Arc<Metrics>,
}

#[async_trait]
impl RequestHandler for CallToolHandler {
    async fn handle(&self, _exchange: Exchange, params: Option<Value>) -> Result<Value> {
        let params: CallToolParams = params
            .ok_or_else(|| Error::InvalidParams("missing params".to_string()))
            .and_then(|v| {
                serde_json::from_value(v).map_err(|e| Error::InvalidParams(e.to_string()))
            })?;

        self.metrics.inc_tool_calls();

        let mut arguments = params.arguments;
        arguments.insert(
            "sl_tool_name".to_string(),
            Value::String(params.name.clone()),
        );

        let body = self.pipeline.invoke(&serde_json::to_value(arguments)?).await?;

        let response: Value = serde_json::from_str(&body)
            .map_err(|e| Error::McpProtocol(format!("Invalid pipeline response: {}", e)))?;

        let first = response.get(0).ok_or_else(|| {
            Error::McpProtocol("Pipeline response was empty".to_string())
        })?;

        Ok(serde_json::to_value(CallToolResult::text(first.to_string()))?)
    }
}

/// `logging/setLevel`: update the server's minimum logging level.
struct SetLevelHandler {
    level: Arc<RwLock<LoggingLevel>>,
}

#[async_trait]
impl RequestHandler for SetLevelHandler {
    async fn handle(&self, _exchange: Exchange, params: Option<Value>) -> Result<Value> {
        #[derive(Deserialize)]
        struct SetLevelParams {
            level: LoggingLevel,
        }

        let params =
            params.ok_or_else(|| Error::InvalidParams("missing level".to_string()))?;

        // Accept the MCP shape `{"level": ...}` or a bare level string.
        let level = serde_json::from_value::<SetLevelParams>(params.clone())
            .map(|p| p.level)
            .or_else(|_| serde_json::from_value::<LoggingLevel>(params))
            .map_err(|e| Error::InvalidParams(e.to_string()))?;

        *self.level.write().await = level;
        info!("Minimum logging level set to {:?}", level);
        Ok(json!({}))
    }
}

/// `notifications/initialized`: acknowledgement of the client's
/// post-handshake notification, nothing to do.
struct InitializedHandler;

#[async_trait]
impl NotificationHandler for InitializedHandler {
    async fn handle(&self, exchange: Exchange, _params: Option<Value>) -> Result<()> {
        debug!(
            "Session {}: client reports initialized",
            exchange.session_id()
        );
        Ok(())
    }
}
