//! Exchange handed to handlers for calling back into the client.

use std::sync::Arc;

use crate::error::Result;
use crate::mcp::protocol::{
    ClientCapabilities, Implementation, ListRootsResult, PaginatedRequest, METHOD_ROOTS_LIST,
};
use crate::mcp::session::McpSession;

/// A narrow capability over one session, handed to each handler invocation
/// so it can issue server-to-client requests without knowing the session
/// type. Holds no state of its own.
#[derive(Clone)]
pub struct Exchange {
    session: Arc<McpSession>,
}

impl Exchange {
    pub(crate) fn new(session: Arc<McpSession>) -> Self {
        Self { session }
    }

    /// The id of the session this exchange belongs to.
    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    /// Capabilities the client declared during initialize.
    pub fn client_capabilities(&self) -> Option<ClientCapabilities> {
        self.session.client_capabilities()
    }

    /// Implementation info the client declared during initialize.
    pub fn client_info(&self) -> Option<Implementation> {
        self.session.client_info()
    }

    /// Ask the client for its list of roots.
    pub async fn list_roots(&self, cursor: Option<String>) -> Result<ListRootsResult> {
        let params = serde_json::to_value(PaginatedRequest { cursor })?;
        let value = self
            .session
            .send_request(METHOD_ROOTS_LIST, Some(params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
