//! Configuration management for the Pipeline MCP Server.

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments for the server.
#[derive(Parser, Debug, Clone)]
#[command(name = "pipeline-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server that fronts an upstream pipeline over HTTP/SSE")]
pub struct Args {
    /// HTTP listen port
    #[arg(short, long, default_value = "45451", env = "PIPELINE_MCP_PORT")]
    pub port: u16,

    /// Server name reported to clients during initialize
    #[arg(long, default_value = "custom-server", env = "PIPELINE_MCP_SERVER_NAME")]
    pub server_name: String,

    /// Server version reported to clients during initialize
    #[arg(long, default_value = "0.0.1", env = "PIPELINE_MCP_SERVER_VERSION")]
    pub server_version: String,

    /// Upstream pipeline endpoint URL
    #[arg(long, env = "PIPELINE_MCP_URL")]
    pub pipeline_url: String,

    /// Bearer token for the upstream pipeline
    #[arg(long, env = "PIPELINE_MCP_TOKEN")]
    pub pipeline_token: String,

    /// Supported MCP protocol versions, ordered oldest to newest
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "2024-11-05",
        env = "PIPELINE_MCP_PROTOCOL_VERSIONS"
    )]
    pub protocol_versions: Vec<String>,

    /// Announce tool list changes to connected clients
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        env = "PIPELINE_MCP_TOOLS_LIST_CHANGED"
    )]
    pub tools_list_changed: bool,

    /// Declare the logging capability
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        env = "PIPELINE_MCP_LOGGING"
    )]
    pub logging: bool,

    /// Upstream request timeout in seconds
    #[arg(long, default_value = "300", env = "PIPELINE_MCP_UPSTREAM_TIMEOUT")]
    pub upstream_timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long, env = "PIPELINE_MCP_DEBUG")]
    pub debug: bool,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// Server name
    pub server_name: String,
    /// Server version
    pub server_version: String,
    /// Pipeline endpoint URL
    pub pipeline_url: String,
    /// Pipeline bearer token
    pub pipeline_token: String,
    /// Supported protocol versions
    pub protocol_versions: Vec<String>,
    /// Tool list-changed announcements
    pub tools_list_changed: bool,
    /// Logging capability
    pub logging: bool,
    /// Upstream timeout in seconds
    pub upstream_timeout_secs: u64,
    /// Debug mode
    pub debug: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            port: args.port,
            server_name: args.server_name,
            server_version: args.server_version,
            pipeline_url: args.pipeline_url,
            pipeline_token: args.pipeline_token,
            protocol_versions: args.protocol_versions,
            tools_list_changed: args.tools_list_changed,
            logging: args.logging,
            upstream_timeout_secs: args.upstream_timeout_secs,
            debug: args.debug,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 45451,
            server_name: "custom-server".to_string(),
            server_version: "0.0.1".to_string(),
            pipeline_url: String::new(),
            pipeline_token: String::new(),
            protocol_versions: vec![crate::mcp::protocol::LATEST_PROTOCOL_VERSION.to_string()],
            tools_list_changed: true,
            logging: true,
            upstream_timeout_secs: 300,
            debug: false,
        }
    }
}
