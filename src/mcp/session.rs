//! Per-client MCP session state machine.
//!
//! One session per connected SSE stream. The session owns the correlation
//! table for outstanding server-to-client requests, the ordered send queue
//! feeding its stream, and the lifecycle state. Inbound messages are routed
//! to the handler tables supplied by the server facade.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::mcp::exchange::Exchange;
use crate::mcp::handler::{NotificationHandler, RequestHandler};
use crate::mcp::protocol::{
    ClientCapabilities, Implementation, InitializeRequest, InitializeResult, JsonRpcError,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, Message, RequestId, ServerCapabilities,
    LATEST_PROTOCOL_VERSION, METHOD_INITIALIZE, METHOD_PING,
};
use crate::metrics::Metrics;

/// Settings consulted by the initialize handshake.
#[derive(Debug, Clone)]
pub struct InitSettings {
    pub server_info: Implementation,
    pub capabilities: ServerCapabilities,
    /// Supported protocol versions, ordered oldest to newest.
    pub protocol_versions: Vec<String>,
    pub instructions: Option<String>,
}

/// Handler tables shared by every session of one server.
pub struct SessionHandlers {
    pub init: InitSettings,
    pub requests: HashMap<String, Arc<dyn RequestHandler>>,
    pub notifications: HashMap<String, Arc<dyn NotificationHandler>>,
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Initialized,
    Closed,
}

#[derive(Debug)]
struct SessionState {
    lifecycle: Lifecycle,
    protocol_version: Option<String>,
    client_capabilities: Option<ClientCapabilities>,
    client_info: Option<Implementation>,
}

type PendingSender = oneshot::Sender<std::result::Result<Value, JsonRpcError>>;

/// A single client session bound to one SSE stream.
pub struct McpSession {
    id: String,
    sink: mpsc::UnboundedSender<Message>,
    state: Mutex<SessionState>,
    /// Outstanding server-to-client requests, keyed by outbound id.
    pending: Mutex<HashMap<RequestId, PendingSender>>,
    next_request_id: AtomicI64,
    handlers: Arc<SessionHandlers>,
    metrics: Arc<Metrics>,
}

impl McpSession {
    /// Create a session writing outbound frames to `sink`.
    pub fn new(
        id: String,
        sink: mpsc::UnboundedSender<Message>,
        handlers: Arc<SessionHandlers>,
        metrics: Arc<Metrics>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            sink,
            state: Mutex::new(SessionState {
                lifecycle: Lifecycle::Created,
                protocol_version: None,
                client_capabilities: None,
                client_info: None,
            }),
            pending: Mutex::new(HashMap::new()),
            next_request_id: AtomicI64::new(1),
            handlers,
            metrics,
        })
    }

    /// The opaque session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lock().unwrap().lifecycle
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle() == Lifecycle::Initialized
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle() == Lifecycle::Closed
    }

    /// Capabilities the client declared during initialize.
    pub fn client_capabilities(&self) -> Option<ClientCapabilities> {
        self.state.lock().unwrap().client_capabilities.clone()
    }

    /// Implementation info the client declared during initialize.
    pub fn client_info(&self) -> Option<Implementation> {
        self.state.lock().unwrap().client_info.clone()
    }

    /// Protocol version negotiated during initialize.
    pub fn protocol_version(&self) -> Option<String> {
        self.state.lock().unwrap().protocol_version.clone()
    }

    /// Number of in-flight outbound requests.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Accept one inbound message from the transport and route it.
    pub async fn handle_message(self: Arc<Self>, message: Message) {
        if self.is_closed() {
            debug!("Session {}: closed, dropping inbound message", self.id);
            return;
        }

        match message {
            Message::Request(request) => {
                let response = self.dispatch_request(request).await;
                if let Err(e) = self.send_message(Message::Response(response)) {
                    warn!("Session {}: failed to emit response: {}", self.id, e);
                }
            }
            Message::Notification(notification) => {
                self.dispatch_notification(notification).await;
            }
            Message::Response(response) => {
                self.complete_pending(response);
            }
        }
    }

    /// Dispatch an inbound request and build the single response frame for
    /// its id.
    async fn dispatch_request(self: &Arc<Self>, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(
            "Session {}: handling request {} (id: {})",
            self.id, request.method, request.id
        );
        self.metrics.inc_requests();

        let id = request.id.clone();
        let result = self.route_request(request).await;

        match result {
            Ok(value) => {
                self.metrics.inc_success();
                JsonRpcResponse::success(id, value)
            }
            Err(e) => {
                self.metrics.inc_failed();
                debug!("Session {}: request {} failed: {}", self.id, id, e);
                JsonRpcResponse::error(id, e.to_jsonrpc_error())
            }
        }
    }

    async fn route_request(self: &Arc<Self>, request: JsonRpcRequest) -> Result<Value> {
        if request.method == METHOD_INITIALIZE {
            return self.handle_initialize(request.params);
        }

        // Only initialize and ping may run before the handshake completes.
        if !self.is_initialized() && request.method != METHOD_PING {
            return Err(Error::InvalidRequest(format!(
                "session not initialized, rejecting '{}'",
                request.method
            )));
        }

        let handler = self
            .handlers
            .requests
            .get(&request.method)
            .cloned()
            .ok_or(Error::MethodNotFound(request.method))?;

        handler
            .handle(Exchange::new(Arc::clone(self)), request.params)
            .await
    }

    /// The initialize handshake: negotiate a protocol version, capture the
    /// client identity, and transition Created -> Initialized.
    ///
    /// Version negotiation is lenient. A supported client version is echoed
    /// back; anything else is answered with the server's highest supported
    /// version. The request itself never fails on a version mismatch.
    fn handle_initialize(&self, params: Option<Value>) -> Result<Value> {
        let request: InitializeRequest =
            serde_json::from_value(params.unwrap_or_else(|| Value::Object(Default::default())))
                .map_err(|e| Error::InvalidParams(e.to_string()))?;

        info!(
            "Session {}: client initialize - protocol: {:?}, info: {:?}",
            self.id, request.protocol_version, request.client_info
        );

        let init = &self.handlers.init;
        let mut version = init
            .protocol_versions
            .last()
            .cloned()
            .unwrap_or_else(|| LATEST_PROTOCOL_VERSION.to_string());

        if init.protocol_versions.contains(&request.protocol_version) {
            version = request.protocol_version.clone();
        } else {
            warn!(
                "Session {}: client requested unsupported protocol version {:?}, offering {}",
                self.id, request.protocol_version, version
            );
        }

        {
            let mut state = self.state.lock().unwrap();
            if state.lifecycle == Lifecycle::Closed {
                return Err(Error::SessionClosed);
            }
            state.protocol_version = Some(version.clone());
            state.client_capabilities = Some(request.capabilities);
            state.client_info = request.client_info;
            state.lifecycle = Lifecycle::Initialized;
        }

        let result = InitializeResult {
            protocol_version: version,
            capabilities: init.capabilities.clone(),
            server_info: init.server_info.clone(),
            instructions: init.instructions.clone(),
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn dispatch_notification(self: &Arc<Self>, notification: JsonRpcNotification) {
        debug!(
            "Session {}: handling notification {}",
            self.id, notification.method
        );

        match self.handlers.notifications.get(&notification.method).cloned() {
            Some(handler) => {
                let exchange = Exchange::new(Arc::clone(self));
                if let Err(e) = handler.handle(exchange, notification.params).await {
                    warn!(
                        "Session {}: notification handler {} failed: {}",
                        self.id, notification.method, e
                    );
                }
            }
            None => {
                debug!(
                    "Session {}: no handler for notification {}, dropping",
                    self.id, notification.method
                );
            }
        }
    }

    /// Complete the pending outbound request matching an inbound response.
    fn complete_pending(&self, response: JsonRpcResponse) {
        let pending = self.pending.lock().unwrap().remove(&response.id);
        match pending {
            Some(tx) => {
                let outcome = match (response.result, response.error) {
                    (_, Some(error)) => Err(error),
                    (Some(value), None) => Ok(value),
                    (None, None) => Ok(Value::Null),
                };
                let _ = tx.send(outcome);
            }
            None => {
                warn!(
                    "Session {}: dropping stale or duplicate response for id {}",
                    self.id, response.id
                );
            }
        }
    }

    /// Issue a server-to-client request and await its response.
    ///
    /// Allocates a request id unique within this session, registers it in
    /// the correlation table, and emits the frame. The future resolves when
    /// the matching response arrives, or with [`Error::SessionClosed`] if
    /// the session closes first.
    pub async fn send_request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = RequestId::Number(self.next_request_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id.clone(), tx);

        let request = JsonRpcRequest::new(id.clone(), method, params);
        if let Err(e) = self.send_message(Message::Request(request)) {
            self.pending.lock().unwrap().remove(&id);
            return Err(e);
        }

        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(Error::JsonRpc {
                code: error.code,
                message: error.message,
                data: error.data,
            }),
            Err(_) => Err(Error::SessionClosed),
        }
    }

    /// Emit a notification frame.
    pub fn send_notification(&self, method: &str, params: Option<Value>) -> Result<()> {
        self.send_message(Message::Notification(JsonRpcNotification::new(
            method, params,
        )))
    }

    /// Queue one outbound frame. Frames are written to the stream in the
    /// order they are queued here.
    pub fn send_message(&self, message: Message) -> Result<()> {
        if self.is_closed() {
            return Err(Error::SessionClosed);
        }
        self.sink.send(message).map_err(|_| Error::SessionClosed)
    }

    /// Close the session: drop further inbound messages and cancel every
    /// pending outbound request with `SessionClosed`.
    pub fn close(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if state.lifecycle == Lifecycle::Closed {
                return;
            }
            state.lifecycle = Lifecycle::Closed;
        }

        // Dropping the completion handles fails the awaiting futures.
        let cancelled = self.pending.lock().unwrap().drain().count();
        if cancelled > 0 {
            debug!(
                "Session {}: cancelled {} pending outbound requests",
                self.id, cancelled
            );
        }
        info!("Session {} closed", self.id);
    }
}

/// Registry of live sessions, keyed by opaque session id.
///
/// Shared between the transport (which registers and removes) and the
/// server facade (which broadcasts).
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<McpSession>>>,
    metrics: Arc<Metrics>,
}

impl SessionRegistry {
    pub fn new(metrics: Arc<Metrics>) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            metrics,
        })
    }

    /// Register a session. Called before the SSE stream is flushed.
    pub fn register(&self, session: Arc<McpSession>) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(session.id().to_string(), session);
        self.metrics.set_active_sessions(sessions.len() as u64);
    }

    /// Remove a session from the registry, returning it for closing.
    pub fn remove(&self, session_id: &str) -> Option<Arc<McpSession>> {
        let mut sessions = self.sessions.write().unwrap();
        let removed = sessions.remove(session_id);
        self.metrics.set_active_sessions(sessions.len() as u64);
        removed
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<McpSession>> {
        self.sessions.read().unwrap().get(session_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().unwrap().is_empty()
    }

    /// Broadcast a notification to every registered session, best-effort.
    /// A failure on one session does not abort the others.
    pub fn notify_all(&self, method: &str, params: Option<Value>) {
        let sessions: Vec<Arc<McpSession>> =
            self.sessions.read().unwrap().values().cloned().collect();
        debug!("Broadcasting {} to {} sessions", method, sessions.len());
        self.metrics.inc_broadcasts();

        for session in sessions {
            if let Err(e) = session.send_notification(method, params.clone()) {
                warn!(
                    "Broadcast of {} to session {} failed: {}",
                    method,
                    session.id(),
                    e
                );
            }
        }
    }

    /// Close and deregister every session (server shutdown).
    pub fn close_all(&self) {
        let sessions: Vec<Arc<McpSession>> = {
            let mut map = self.sessions.write().unwrap();
            let drained = map.drain().map(|(_, s)| s).collect();
            self.metrics.set_active_sessions(0);
            drained
        };
        for session in sessions {
            session.close();
        }
    }
}
