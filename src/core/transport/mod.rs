//! Transport layer for the MCP server.
//!
//! - **STDIO**: standard input/output, driven by rmcp - feature: `stdio`
//! - **SSE**: HTTP server pushing responses over Server-Sent Events, one
//!   session per open stream - feature: `sse`
//!
//! Both delegate message processing to [`McpServer`](crate::core::McpServer).

mod config;
mod error;
mod service;

#[cfg(feature = "sse")]
pub mod jsonrpc;

#[cfg(feature = "sse")]
pub mod session;

#[cfg(feature = "sse")]
pub mod sse;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "sse")]
pub use config::SseConfig;
