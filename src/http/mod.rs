//! HTTP/SSE transport for MCP sessions.
//!
//! Two routes carry the whole protocol: `GET /sse` opens a session and
//! streams server-to-client frames, `POST /message?sessionId=...` delivers
//! one client-to-server message. The first SSE event tells the client where
//! to POST.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::mcp::protocol::{
    decode_message, encode_message, error_codes, JsonRpcError, JsonRpcResponse, Message, RequestId,
};
use crate::mcp::server::McpServer;
use crate::mcp::session::{McpSession, SessionRegistry};

/// Transport state shared by the route handlers.
#[derive(Clone)]
pub struct HttpState {
    server: Arc<McpServer>,
    registry: Arc<SessionRegistry>,
}

/// Start the HTTP server and serve until shutdown.
pub async fn start_server(config: &Config, server: Arc<McpServer>) -> Result<()> {
    let app = router(server);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting HTTP/SSE transport on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the transport router for the given server.
pub fn router(server: Arc<McpServer>) -> Router {
    let state = HttpState {
        registry: server.registry(),
        server,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/sse", get(open_sse))
        .route("/message", post(post_message))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The relative POST URL for a session, sent as the `endpoint` event.
fn message_endpoint(session_id: &str) -> String {
    format!("/message?sessionId={}", session_id)
}

/// Removes and closes the session when its SSE stream is dropped.
struct SessionGuard {
    registry: Arc<SessionRegistry>,
    session: Arc<McpSession>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        info!("Session {} disconnected", self.session.id());
        self.registry.remove(self.session.id());
        self.session.close();
    }
}

/// Health check endpoint.
async fn health_check(State(state): State<HttpState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "server": state.server.server_info().name.clone(),
        "version": crate::VERSION,
        "sessions": state.registry.len(),
        "metrics": state.server.metrics().snapshot(),
    }))
}

/// `GET /sse`: open a new session and stream its frames until the client
/// disconnects.
async fn open_sse(
    State(state): State<HttpState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::unbounded_channel();

    let session = state.server.create_session(session_id.clone(), tx);
    // Registered before the endpoint event is flushed.
    state.registry.register(session.clone());
    info!("Session {} connected", session_id);

    let endpoint_event = Event::default()
        .event("endpoint")
        .data(message_endpoint(&session_id));

    let guard = SessionGuard {
        registry: state.registry.clone(),
        session,
    };

    let frames = UnboundedReceiverStream::new(rx).filter_map(move |message| {
        // The guard lives as long as the stream; dropping the stream closes
        // the session.
        let _keep = &guard;
        future::ready(match encode_message(&message) {
            Ok(data) => Some(Ok::<Event, Infallible>(
                Event::default().event("message").data(data),
            )),
            Err(e) => {
                error!("Failed to encode outbound frame: {}", e);
                None
            }
        })
    });

    let stream = stream::once(future::ready(Ok::<Event, Infallible>(endpoint_event))).chain(frames);

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    )
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// `POST /message?sessionId=...`: deliver one JSON-RPC message. Returns 200
/// once the message is accepted; handler results flow back over SSE.
async fn post_message(
    State(state): State<HttpState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let Some(session) = state.registry.get(&query.session_id) else {
        warn!("POST for unknown session {}", query.session_id);
        return (StatusCode::NOT_FOUND, "session not found").into_response();
    };

    match decode_message(&body) {
        Ok(message) => {
            tokio::spawn(session.handle_message(message));
            StatusCode::OK.into_response()
        }
        Err(e) => {
            warn!("Session {}: malformed message: {}", query.session_id, e);
            if let Some(reply) = malformed_reply(&body) {
                if let Err(send_err) = session.send_message(Message::Response(reply)) {
                    warn!(
                        "Session {}: could not emit parse-error reply: {}",
                        query.session_id, send_err
                    );
                }
            }
            (StatusCode::BAD_REQUEST, "malformed JSON-RPC message").into_response()
        }
    }
}

/// Build the error response for an undecodable body, when an id can be
/// recovered from it. Unparseable bodies yield nothing and are dropped.
fn malformed_reply(body: &str) -> Option<JsonRpcResponse> {
    let value: Value = serde_json::from_str(body).ok()?;
    let id: RequestId = serde_json::from_value(value.get("id")?.clone()).ok()?;
    Some(JsonRpcResponse::error(
        id,
        JsonRpcError::new(
            error_codes::INVALID_REQUEST,
            "message matches no JSON-RPC variant",
        ),
    ))
}
