//! Error types for the Pipeline MCP Server.

use serde_json::Value;
use thiserror::Error;

use crate::mcp::protocol::{error_codes, JsonRpcError};

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the server.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Upstream Errors =====
    #[error("Pipeline error: {status} {status_text} - {message}")]
    Api {
        status: u16,
        status_text: String,
        message: String,
    },

    // ===== MCP Errors =====
    #[error("MCP protocol error: {0}")]
    McpProtocol(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc {
        code: i32,
        message: String,
        data: Option<Value>,
    },

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Tool with name '{0}' already exists")]
    DuplicateTool(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    // ===== I/O Errors =====
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP server error: {0}")]
    HttpServer(String),

    // ===== Internal Errors =====
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout: operation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

impl Error {
    /// Create an upstream error from HTTP response details.
    pub fn api(status: u16, status_text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            status_text: status_text.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retriable (transient failures).
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Api { status, .. } => {
                *status == 499 || *status == 503 || (*status >= 500 && *status < 600)
            }
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Convert into the JSON-RPC error that a response frame should carry.
    ///
    /// A `JsonRpc` variant is passed through verbatim so handlers can
    /// surface upstream error structures unchanged; everything else maps to
    /// the standard code for its class.
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            Self::JsonRpc {
                code,
                message,
                data,
            } => JsonRpcError {
                code: *code,
                message: message.clone(),
                data: data.clone(),
            },
            Self::MethodNotFound(method) => JsonRpcError::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            ),
            Self::InvalidRequest(msg) => {
                JsonRpcError::new(error_codes::INVALID_REQUEST, msg.clone())
            }
            Self::InvalidParams(msg) => JsonRpcError::new(error_codes::INVALID_PARAMS, msg.clone()),
            Self::MalformedMessage(msg) => {
                JsonRpcError::new(error_codes::PARSE_ERROR, msg.clone())
            }
            other => JsonRpcError::new(error_codes::INTERNAL_ERROR, other.to_string()),
        }
    }
}
