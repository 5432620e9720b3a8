//! Model Context Protocol (MCP) implementation.
//!
//! # Architecture
//!
//! - `protocol` - JSON-RPC types, the wire codec, and MCP schema records
//! - `handler` - Request, notification, and tool handler traits
//! - `session` - Per-client state machine and the live-session registry
//! - `server` - Server facade, builder, and built-in handlers
//! - `exchange` - Capability handle for calling back into the client

pub mod exchange;
pub mod handler;
pub mod protocol;
pub mod server;
pub mod session;

pub use exchange::Exchange;
pub use handler::{NotificationHandler, RequestHandler, ToolHandler};
pub use protocol::*;
pub use server::{McpServer, McpServerBuilder, ToolSpecification};
pub use session::{InitSettings, Lifecycle, McpSession, SessionHandlers, SessionRegistry};
