//! Pipeline MCP Server entry point.

use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pipeline_mcp::config::{Args, Config};
use pipeline_mcp::error::Result;
use pipeline_mcp::http;
use pipeline_mcp::mcp::protocol::ServerCapabilities;
use pipeline_mcp::mcp::server::McpServer;
use pipeline_mcp::pipeline::PipelineClient;
use pipeline_mcp::VERSION;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config: Config = args.into();

    info!("Pipeline MCP Server v{}", VERSION);
    info!("Pipeline endpoint: {}", config.pipeline_url);

    let pipeline = Arc::new(PipelineClient::new(
        config.pipeline_url.clone(),
        config.pipeline_token.clone(),
        config.upstream_timeout_secs,
    )?);

    let mut capabilities = ServerCapabilities::default().with_tools(config.tools_list_changed);
    if config.logging {
        capabilities = capabilities.with_logging();
    }

    let server = McpServer::builder()
        .server_info(&config.server_name, &config.server_version)
        .capabilities(capabilities)
        .protocol_versions(config.protocol_versions.clone())
        .pipeline(pipeline)
        .build()?;

    http::start_server(&config, server).await?;

    Ok(())
}
