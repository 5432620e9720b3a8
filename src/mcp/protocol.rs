//! MCP protocol types and wire codec.
//!
//! JSON-RPC 2.0 base types, the structural message decoder, and the schema
//! records used by the tool-serving core.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// JSON-RPC version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Highest MCP protocol version this server speaks.
pub const LATEST_PROTOCOL_VERSION: &str = "2024-11-05";

// ===== Method Names =====

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_NOTIFICATION_INITIALIZED: &str = "notifications/initialized";
pub const METHOD_PING: &str = "ping";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";
pub const METHOD_NOTIFICATION_TOOLS_LIST_CHANGED: &str = "notifications/tools/list_changed";
pub const METHOD_LOGGING_SET_LEVEL: &str = "logging/setLevel";
pub const METHOD_ROOTS_LIST: &str = "roots/list";

// ===== JSON-RPC Base Types =====

/// A JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a request with the current JSON-RPC version.
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC response.
///
/// Carries either `result` or `error`, never both; use the constructors to
/// keep that invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// A JSON-RPC notification (no id, no response expected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Create a notification with the current JSON-RPC version.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create an error without attached data.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Request ID (string or number, never interpreted).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

// ===== Wire Codec =====

/// A decoded wire message.
#[derive(Debug, Clone)]
pub enum Message {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Notification(JsonRpcNotification),
}

/// Decode one JSON-RPC message from UTF-8 JSON text.
///
/// The variant is chosen by structure, not by a declared tag: a `method`
/// with an `id` is a request, a `method` without an `id` is a notification,
/// and a `result` or `error` is a response. Anything else fails with
/// [`Error::MalformedMessage`].
pub fn decode_message(text: &str) -> Result<Message> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| Error::MalformedMessage(e.to_string()))?;

    let map = value
        .as_object()
        .ok_or_else(|| Error::MalformedMessage("message is not a JSON object".to_string()))?;

    if map.contains_key("method") && map.contains_key("id") {
        serde_json::from_value(value)
            .map(Message::Request)
            .map_err(|e| Error::MalformedMessage(e.to_string()))
    } else if map.contains_key("method") {
        serde_json::from_value(value)
            .map(Message::Notification)
            .map_err(|e| Error::MalformedMessage(e.to_string()))
    } else if map.contains_key("result") || map.contains_key("error") {
        serde_json::from_value(value)
            .map(Message::Response)
            .map_err(|e| Error::MalformedMessage(e.to_string()))
    } else {
        Err(Error::MalformedMessage(
            "message matches no JSON-RPC variant".to_string(),
        ))
    }
}

/// Encode one message as compact JSON text.
///
/// Absent optional fields are omitted entirely, never emitted as `null`.
pub fn encode_message(message: &Message) -> Result<String> {
    let text = match message {
        Message::Request(req) => serde_json::to_string(req)?,
        Message::Response(res) => serde_json::to_string(res)?,
        Message::Notification(notif) => serde_json::to_string(notif)?,
    };
    Ok(text)
}

// ===== Initialization =====

/// Client or server implementation info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// Capabilities declared by a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roots: Option<RootCapabilities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingCapability>,
}

/// Roots capability of a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Sampling capability marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamplingCapability {}

/// Capabilities declared by the server, immutable once built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapabilities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
}

impl ServerCapabilities {
    /// Declare the tools capability.
    pub fn with_tools(mut self, list_changed: bool) -> Self {
        self.tools = Some(ToolCapabilities {
            list_changed: Some(list_changed),
        });
        self
    }

    /// Declare the logging capability.
    pub fn with_logging(mut self) -> Self {
        self.logging = Some(LoggingCapabilities {});
        self
    }

    /// Whether tool-list-changed notifications were declared.
    pub fn tools_list_changed(&self) -> bool {
        self.tools
            .as_ref()
            .and_then(|t| t.list_changed)
            .unwrap_or(false)
    }
}

/// Logging capability marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingCapabilities {}

/// Tools capability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// The `initialize` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequest {
    #[serde(default)]
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: ClientCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<Implementation>,
}

/// The `initialize` response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

// ===== Tools =====

/// Tool definition, unique by name within a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: JsonSchema,
}

impl Tool {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: JsonSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Restricted JSON-Schema fragment for tool inputs: a top-level type, a map
/// of property name to type, a required list, and an additionalProperties
/// flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: HashMap<String, SchemaProperty>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<bool>,
}

impl JsonSchema {
    /// An object schema with the given properties and required names.
    pub fn object(properties: HashMap<String, SchemaProperty>, required: Vec<String>) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties,
            required,
            additional_properties: Some(false),
        }
    }
}

/// A single property inside a [`JsonSchema`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaProperty {
    #[serde(rename = "type")]
    pub schema_type: String,
}

impl SchemaProperty {
    pub fn new(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: schema_type.into(),
        }
    }
}

/// Content block, tagged by a `type` string on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    #[serde(rename_all = "camelCase")]
    Text { text: String },
    #[serde(rename_all = "camelCase")]
    Image { data: String, mime_type: String },
    #[serde(rename_all = "camelCase")]
    Resource {
        uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

/// The `tools/call` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: HashMap<String, Value>,
}

/// The `tools/call` response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// A successful result wrapping one text content entry.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: None,
        }
    }

    /// A failed result wrapping one text content entry.
    pub fn error_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: Some(true),
        }
    }
}

/// The `tools/list` response payload.
///
/// `nextCursor` is always present on the wire, as `null` when there is no
/// further page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
    pub next_cursor: Option<String>,
}

// ===== Roots =====

/// A root exposed by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Root {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The `roots/list` response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRootsResult {
    pub roots: Vec<Root>,
}

/// Cursor-bearing request params for paginated listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

// ===== Logging =====

/// Syslog-style logging severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    #[default]
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl LoggingLevel {
    /// Numeric rank of the level.
    pub fn level(&self) -> u8 {
        *self as u8
    }
}

// ===== Error Codes =====

/// Standard JSON-RPC error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_request() {
        let text = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"echo"}}"#;
        match decode_message(text).unwrap() {
            Message::Request(req) => {
                assert_eq!(req.method, "tools/call");
                assert_eq!(req.id, RequestId::Number(1));
                assert_eq!(req.params.unwrap()["name"], "echo");
            }
            other => panic!("Expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_notification() {
        let text = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        match decode_message(text).unwrap() {
            Message::Notification(notif) => {
                assert_eq!(notif.method, "notifications/initialized");
                assert!(notif.params.is_none());
            }
            other => panic!("Expected notification, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_response_result_and_error() {
        let ok = r#"{"jsonrpc":"2.0","id":"r1","result":{"roots":[]}}"#;
        match decode_message(ok).unwrap() {
            Message::Response(res) => {
                assert_eq!(res.id, RequestId::String("r1".to_string()));
                assert!(res.result.is_some());
                assert!(res.error.is_none());
            }
            other => panic!("Expected response, got {:?}", other),
        }

        let err = r#"{"jsonrpc":"2.0","id":2,"error":{"code":-32601,"message":"nope"}}"#;
        match decode_message(err).unwrap() {
            Message::Response(res) => {
                assert_eq!(res.error.unwrap().code, -32601);
            }
            other => panic!("Expected response, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            decode_message("not json at all"),
            Err(crate::Error::MalformedMessage(_))
        ));
        assert!(matches!(
            decode_message("[1,2,3]"),
            Err(crate::Error::MalformedMessage(_))
        ));
        // A bare object matches no variant.
        assert!(matches!(
            decode_message(r#"{"jsonrpc":"2.0"}"#),
            Err(crate::Error::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_decode_ignores_unknown_top_level_fields() {
        let text = r#"{"jsonrpc":"2.0","id":7,"method":"ping","params":{},"extra":"ignored"}"#;
        match decode_message(text).unwrap() {
            Message::Request(req) => assert_eq!(req.method, "ping"),
            other => panic!("Expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let notif = JsonRpcNotification::new(METHOD_NOTIFICATION_TOOLS_LIST_CHANGED, None);
        let text = encode_message(&Message::Notification(notif)).unwrap();
        assert!(!text.contains("params"));
        assert!(!text.contains("id"));

        let res = JsonRpcResponse::success(RequestId::Number(1), json!({}));
        let text = encode_message(&Message::Response(res)).unwrap();
        assert!(text.contains("\"result\""));
        assert!(!text.contains("\"error\""));
    }

    #[test]
    fn test_response_never_carries_both() {
        let ok = JsonRpcResponse::success(RequestId::Number(1), json!({"x": 1}));
        assert!(ok.result.is_some() && ok.error.is_none());

        let err = JsonRpcResponse::error(
            RequestId::Number(1),
            JsonRpcError::new(error_codes::INTERNAL_ERROR, "boom"),
        );
        assert!(err.result.is_none() && err.error.is_some());
    }

    #[test]
    fn test_roundtrip_semantic_equality() {
        let texts = [
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized","params":{"a":[1,2]}}"#,
            r#"{"jsonrpc":"2.0","id":"abc","result":{"tools":[]}}"#,
            r#"{"jsonrpc":"2.0","id":9,"error":{"code":-32603,"message":"m","data":{"k":"v"}}}"#,
        ];

        for text in texts {
            let decoded = decode_message(text).unwrap();
            let encoded = encode_message(&decoded).unwrap();
            let before: Value = serde_json::from_str(text).unwrap();
            let after: Value = serde_json::from_str(&encoded).unwrap();
            assert_eq!(before, after, "round trip changed {}", text);
        }
    }

    #[test]
    fn test_request_id_variants() {
        assert_eq!(
            serde_json::to_string(&RequestId::Number(42)).unwrap(),
            "42"
        );
        assert_eq!(
            serde_json::to_string(&RequestId::String("r-1".to_string())).unwrap(),
            "\"r-1\""
        );
        assert_eq!(RequestId::Number(7).to_string(), "7");
        assert_eq!(RequestId::String("x".to_string()).to_string(), "x");
    }

    #[test]
    fn test_server_capabilities_builders() {
        let caps = ServerCapabilities::default().with_tools(true).with_logging();
        assert!(caps.tools_list_changed());
        assert!(caps.logging.is_some());

        let json = serde_json::to_string(&caps).unwrap();
        assert!(json.contains("\"listChanged\":true"));
        assert!(json.contains("\"logging\""));

        let bare = ServerCapabilities::default();
        assert!(!bare.tools_list_changed());
        assert_eq!(serde_json::to_string(&bare).unwrap(), "{}");
    }

    #[test]
    fn test_initialize_request_lenient_decode() {
        // Everything defaulted when the client sends a bare object.
        let req: InitializeRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.protocol_version.is_empty());
        assert!(req.client_info.is_none());

        let req: InitializeRequest = serde_json::from_value(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {"roots": {"listChanged": true}},
            "clientInfo": {"name": "c", "version": "1"}
        }))
        .unwrap();
        assert_eq!(req.protocol_version, "2024-11-05");
        assert_eq!(req.capabilities.roots.unwrap().list_changed, Some(true));
        assert_eq!(req.client_info.unwrap().name, "c");
    }

    #[test]
    fn test_initialize_result_serialization() {
        let result = InitializeResult {
            protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default().with_tools(true),
            server_info: Implementation {
                name: "custom-server".to_string(),
                version: "0.0.1".to_string(),
            },
            instructions: None,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"protocolVersion\":\"2024-11-05\""));
        assert!(json.contains("\"serverInfo\""));
        assert!(!json.contains("instructions"));
    }

    #[test]
    fn test_tool_schema_serialization() {
        let mut properties = HashMap::new();
        properties.insert("msg".to_string(), SchemaProperty::new("string"));
        let tool = Tool::new(
            "echo",
            "e",
            JsonSchema::object(properties, vec!["msg".to_string()]),
        );

        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "echo",
                "description": "e",
                "inputSchema": {
                    "type": "object",
                    "properties": {"msg": {"type": "string"}},
                    "required": ["msg"],
                    "additionalProperties": false
                }
            })
        );
    }

    #[test]
    fn test_content_tagged_by_type() {
        let text = Content::Text {
            text: "hello".to_string(),
        };
        let json = serde_json::to_string(&text).unwrap();
        assert!(json.contains("\"type\":\"text\""));

        let image = Content::Image {
            data: "base64".to_string(),
            mime_type: "image/png".to_string(),
        };
        let json = serde_json::to_string(&image).unwrap();
        assert!(json.contains("\"type\":\"image\""));
        assert!(json.contains("\"mimeType\":\"image/png\""));

        let parsed: Content =
            serde_json::from_str(r#"{"type":"resource","uri":"file://x"}"#).unwrap();
        assert!(matches!(parsed, Content::Resource { .. }));
    }

    #[test]
    fn test_call_tool_result_constructors() {
        let ok = CallToolResult::text("{\"reply\":\"hi\"}");
        assert_eq!(ok.content.len(), 1);
        assert!(ok.is_error.is_none());
        let json = serde_json::to_string(&ok).unwrap();
        assert!(!json.contains("isError"));

        let err = CallToolResult::error_text("failed");
        assert_eq!(err.is_error, Some(true));
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"isError\":true"));
    }

    #[test]
    fn test_list_tools_result_emits_null_cursor() {
        let result = ListToolsResult {
            tools: vec![],
            next_cursor: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"nextCursor\":null"));
    }

    #[test]
    fn test_call_tool_params_default_arguments() {
        let params: CallToolParams = serde_json::from_value(json!({"name": "echo"})).unwrap();
        assert_eq!(params.name, "echo");
        assert!(params.arguments.is_empty());
    }

    #[test]
    fn test_logging_level_serde_and_rank() {
        let level: LoggingLevel = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(level, LoggingLevel::Warning);
        assert_eq!(serde_json::to_string(&LoggingLevel::Emergency).unwrap(), "\"emergency\"");

        assert_eq!(LoggingLevel::Debug.level(), 0);
        assert_eq!(LoggingLevel::Emergency.level(), 7);
        assert!(LoggingLevel::Error > LoggingLevel::Info);
        assert_eq!(LoggingLevel::default(), LoggingLevel::Debug);
    }

    #[test]
    fn test_paginated_request_serialization() {
        let with = PaginatedRequest {
            cursor: Some("page-2".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&with).unwrap(),
            r#"{"cursor":"page-2"}"#
        );

        let without = PaginatedRequest { cursor: None };
        assert_eq!(serde_json::to_string(&without).unwrap(), "{}");
    }
}
