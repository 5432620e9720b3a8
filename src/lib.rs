//! Pipeline MCP Server
//!
//! A Model Context Protocol (MCP) server that exposes tools backed by an
//! upstream integration pipeline. The server speaks JSON-RPC 2.0 over an
//! HTTP/SSE transport and forwards tool discovery and execution to a single
//! pipeline endpoint authenticated with a bearer token.
//!
//! # Architecture
//!
//! 1. **MCP Layer** (`mcp`) - Protocol types, per-session state machine,
//!    server facade, and the exchange capability handed to handlers
//! 2. **Transport Layer** (`http`) - HTTP/SSE endpoints and the live
//!    session registry
//! 3. **Pipeline Layer** (`pipeline`) - HTTP client for the upstream
//!    pipeline, with retry and backoff
//! 4. **Support Modules** - Configuration, errors, metrics

pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod metrics;
pub mod pipeline;

pub use error::{Error, Result};

/// Server version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
