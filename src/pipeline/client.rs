//! HTTP client for the upstream pipeline endpoint.
//!
//! Tool discovery and execution both land on one pipeline URL as JSON POSTs
//! with a bearer token. The response is a JSON array; callers inspect its
//! first element.

use reqwest::redirect::Policy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::mcp::protocol::{JsonSchema, SchemaProperty, Tool};
use crate::pipeline::retry::{retry_api, BackoffParams};
use crate::VERSION;

/// User agent string for pipeline requests.
fn user_agent() -> String {
    format!("pipeline-mcp/{} (rust)", VERSION)
}

/// Client for the configured pipeline endpoint.
#[derive(Debug, Clone)]
pub struct PipelineClient {
    client: Client,
    url: String,
    bearer_token: String,
}

impl PipelineClient {
    /// Create a new pipeline client.
    pub fn new(url: String, bearer_token: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(Policy::limited(10))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            bearer_token,
        })
    }

    /// The pipeline endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the given params to the pipeline and return the raw body.
    ///
    /// Transient failures are retried with exponential backoff.
    pub async fn invoke(&self, params: &Value) -> Result<String> {
        let params = params.clone();
        retry_api(
            || async { self.request(&params).await },
            &BackoffParams::default(),
        )
        .await
    }

    async fn request(&self, params: &Value) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.bearer_token))
            .header("Accept", "application/json")
            .header("X-Request-Id", &request_id)
            .json(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("Unknown");
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), status_text, body));
        }

        Ok(response.text().await?)
    }
}

// ===== Pipeline Tool Definitions =====

/// Tool definition as the pipeline reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineToolDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<PipelineParam>,
}

/// One parameter of a pipeline tool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_param_type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
}

fn default_param_type() -> String {
    "STRING".to_string()
}

impl PipelineToolDef {
    /// Convert into an MCP tool definition.
    ///
    /// Each parameter becomes a schema property with the lowercase
    /// JSON-Schema type; required parameters are collected into `required`;
    /// the schema is a closed object.
    pub fn into_tool(self) -> Tool {
        let mut properties = HashMap::new();
        let mut required = Vec::new();

        for param in self.parameters {
            if param.required {
                required.push(param.name.clone());
            }
            properties.insert(
                param.name,
                SchemaProperty::new(json_schema_type(&param.param_type)),
            );
        }

        Tool::new(
            self.name,
            self.description,
            JsonSchema::object(properties, required),
        )
    }
}

/// Map a pipeline parameter type onto its JSON-Schema type. Unknown types
/// default to `string`.
fn json_schema_type(param_type: &str) -> &'static str {
    match param_type.to_uppercase().as_str() {
        "NUMBER" => "number",
        "INTEGER" => "integer",
        "BOOLEAN" => "boolean",
        "ARRAY" => "array",
        "OBJECT" => "object",
        _ => "string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_schema_type_mapping() {
        assert_eq!(json_schema_type("STRING"), "string");
        assert_eq!(json_schema_type("NUMBER"), "number");
        assert_eq!(json_schema_type("INTEGER"), "integer");
        assert_eq!(json_schema_type("BOOLEAN"), "boolean");
        assert_eq!(json_schema_type("ARRAY"), "array");
        assert_eq!(json_schema_type("OBJECT"), "object");
        // Case-insensitive.
        assert_eq!(json_schema_type("boolean"), "boolean");
        assert_eq!(json_schema_type("Integer"), "integer");
        // Unknown types default to string.
        assert_eq!(json_schema_type("DECIMAL"), "string");
        assert_eq!(json_schema_type(""), "string");
    }

    #[test]
    fn test_tool_def_conversion() {
        let def: PipelineToolDef = serde_json::from_value(json!({
            "name": "echo",
            "description": "e",
            "parameters": [
                {"name": "msg", "type": "STRING", "required": true},
                {"name": "count", "type": "INTEGER", "required": false}
            ]
        }))
        .unwrap();

        let tool = def.into_tool();
        assert_eq!(tool.name, "echo");
        assert_eq!(tool.input_schema.schema_type, "object");
        assert_eq!(
            tool.input_schema.properties["msg"].schema_type,
            "string"
        );
        assert_eq!(
            tool.input_schema.properties["count"].schema_type,
            "integer"
        );
        assert_eq!(tool.input_schema.required, vec!["msg"]);
        assert_eq!(tool.input_schema.additional_properties, Some(false));
    }

    #[test]
    fn test_tool_def_defaults() {
        // A definition with no parameters still yields a closed object schema.
        let def: PipelineToolDef =
            serde_json::from_value(json!({"name": "noop", "description": "n"})).unwrap();
        let tool = def.into_tool();
        assert!(tool.input_schema.properties.is_empty());
        assert!(tool.input_schema.required.is_empty());

        // A parameter with no declared type is a string.
        let def: PipelineToolDef = serde_json::from_value(json!({
            "name": "t",
            "description": "d",
            "parameters": [{"name": "p", "required": true}]
        }))
        .unwrap();
        let tool = def.into_tool();
        assert_eq!(tool.input_schema.properties["p"].schema_type, "string");
    }

    #[test]
    fn test_tool_def_serializes_like_upstream() {
        let def: PipelineToolDef = serde_json::from_value(json!({
            "name": "echo",
            "description": "e",
            "parameters": [{"name": "msg", "type": "STRING", "required": true}]
        }))
        .unwrap();

        let tool_json = serde_json::to_value(def.into_tool()).unwrap();
        assert_eq!(
            tool_json,
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
    fn test_client_construction() {
        let client = PipelineClient::new(
            "http://127.0.0.1:8888/feed".to_string(),
            "token".to_string(),
            30,
        )
        .unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:8888/feed");
    }
}
