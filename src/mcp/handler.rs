//! MCP request, notification, and tool handler traits.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::Result;
use crate::mcp::exchange::Exchange;
use crate::mcp::protocol::{CallToolResult, Content};

/// Handler for an inbound request method.
///
/// The returned value becomes the `result` of the response frame; an error
/// becomes its `error`. Handlers run concurrently within a session and must
/// not assume in-order completion.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, exchange: Exchange, params: Option<Value>) -> Result<Value>;
}

/// Handler for an inbound notification method. Notifications never produce
/// a reply; errors are logged and dropped.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    async fn handle(&self, exchange: Exchange, params: Option<Value>) -> Result<()>;
}

/// Handler backing a registered tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with the given arguments.
    async fn call(
        &self,
        exchange: Exchange,
        arguments: HashMap<String, Value>,
    ) -> Result<CallToolResult>;
}

/// Helper to create a text content block.
pub fn text_content(text: impl Into<String>) -> Content {
    Content::Text { text: text.into() }
}
