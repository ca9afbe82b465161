//! Weather Insight MCP Server Library
//!
//! An MCP (Model Context Protocol) server whose tools call external JSON APIs
//! and an LLM chat-completion endpoint, answering every call with a single
//! text item.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, resilient fetching, the server
//!   handler and the transports (STDIO, HTTP+SSE)
//! - **domains**: business logic
//!   - **tools**: `weather-insight`, `raw-completion`, `dog-image`
//!   - **upstream**: geocoding, forecast, chat completion and dog image steps
//!
//! # Example
//!
//! ```rust,no_run
//! use weather_insight_mcp::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
