//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to the tools domain.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool.
//! Each tool defines:
//! - Parameters struct (for rmcp)
//! - `execute()` (the pipeline, always yielding text)
//! - `call()` (argument validation + envelope, shared by all transports)
//!
//! The ToolRouter is built dynamically in `domains/tools/router.rs`.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use crate::domains::tools::{ToolContext, ToolRegistry, build_tool_router};

/// Instructions reported to clients on initialization.
pub const INSTRUCTIONS: &str = "Tools: 'weather-insight' (current temperature plus an AI comment \
     for a city), 'raw-completion' (send a message to the LLM) and 'dog-image' (random picture \
     of a breed). Failures are reported as plain text in the tool result.";

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp and is cheap
/// to clone: every transport connection gets its own clone sharing the
/// same tool context.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Dependencies shared by all tool calls.
    tools: Arc<ToolContext>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> crate::Result<Self> {
        let tools = ToolContext::from_config(Arc::new(config))?;
        Ok(Self::with_context(Arc::new(tools)))
    }

    /// Create a server around an existing tool context.
    pub fn with_context(tools: Arc<ToolContext>) -> Self {
        let registry = ToolRegistry::new(tools.clone());
        info!(tools = ?registry.tool_names(), "Registering tools");

        Self {
            config: tools.config().clone(),
            tool_router: build_tool_router::<Self>(tools.clone()),
            tools,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    // ========================================================================
    // SSE Transport Support Methods
    // ========================================================================

    /// List all available tools (for the SSE transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for the SSE transport).
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> crate::Result<serde_json::Value> {
        let registry = ToolRegistry::new(self.tools.clone());
        let result = registry.call_tool(name, arguments).await?;
        Ok(serde_json::to_value(result)?)
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
