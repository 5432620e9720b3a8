//! Upstream pipeline integration.
//!
//! The server is a protocol adapter: tool discovery and execution are
//! forwarded to a single pipeline endpoint over HTTP. This module owns the
//! client for that endpoint and its retry policy.

pub mod client;
pub mod retry;

pub use client::{PipelineClient, PipelineParam, PipelineToolDef};
pub use retry::{retry_api, BackoffParams};
