//! Raw completion tool.
//!
//! Forwards a free-text message to the LLM provider and returns its reply
//! untouched.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute},
    model::{CallToolResult, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::common::{parse_params, text_result, tool_model};
use crate::domains::tools::{ToolContext, ToolError};

/// Message sent when the caller does not provide one.
pub const DEFAULT_MESSAGE: &str = "Hello!";

/// Parameters for the raw completion tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct RawCompletionParams {
    /// Message to send to the model.
    #[serde(default)]
    #[schemars(description = "Message to send to the model (default: 'Hello!')")]
    pub message: Option<String>,
}

/// Raw completion tool implementation.
#[derive(Debug, Clone)]
pub struct RawCompletionTool;

impl RawCompletionTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "raw-completion";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Send a message to the configured LLM and return its raw text reply.";

    #[instrument(skip_all)]
    pub async fn execute(params: &RawCompletionParams, ctx: &ToolContext) -> String {
        let message = params
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MESSAGE);

        info!(chars = message.len(), "Raw completion requested");

        match ctx.completions().complete(message).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Completion failed");
                format!("Failed to get completion: {e}")
            }
        }
    }

    /// Validate arguments and run the tool (shared by every transport).
    pub async fn call(arguments: JsonObject, ctx: &ToolContext) -> Result<CallToolResult, ToolError> {
        let params: RawCompletionParams = parse_params(arguments)?;
        Ok(text_result(Self::execute(&params, ctx).await))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        tool_model::<RawCompletionParams>(Self::NAME, Self::DESCRIPTION)
    }

    /// Create a ToolRoute for the rmcp-driven transports.
    pub fn create_route<S>(ctx: Arc<ToolContext>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |call: ToolCallContext<'_, S>| {
            let args = call.arguments.clone().unwrap_or_default();
            let ctx = ctx.clone();
            async move {
                Self::call(args, &ctx)
                    .await
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))
            }
            .boxed()
        })
    }
}
