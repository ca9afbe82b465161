//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - Name-based dispatch for the SSE transport, which handles JSON-RPC
//!   itself instead of going through rmcp's `ToolRouter`

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, warn};

use super::ToolContext;
use super::ToolError;
use super::definitions::{DogImageTool, RawCompletionTool, WeatherInsightTool};

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    context: Arc<ToolContext>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            DogImageTool::NAME,
            RawCompletionTool::NAME,
            WeatherInsightTool::NAME,
        ]
    }

    /// Dispatch a tool call by name.
    ///
    /// Only argument and name problems are errors here; pipeline failures
    /// come back as a normal text result.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, ToolError> {
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => JsonObject::new(),
            other => {
                return Err(ToolError::invalid_arguments(format!(
                    "arguments must be an object, got {other}"
                )));
            }
        };

        match name {
            DogImageTool::NAME => DogImageTool::call(arguments, &self.context).await,
            RawCompletionTool::NAME => RawCompletionTool::call(arguments, &self.context).await,
            WeatherInsightTool::NAME => WeatherInsightTool::call(arguments, &self.context).await,
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::unknown_tool(name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::test_support::{ScriptedProvider, config_for, context_with};
    use serde_json::json;

    fn registry(provider: Arc<ScriptedProvider>) -> ToolRegistry {
        ToolRegistry::new(context_with(config_for("http://127.0.0.1:9"), provider))
    }

    fn first_text(result: &CallToolResult) -> String {
        let value = serde_json::to_value(result).unwrap();
        value["content"][0]["text"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_registry_tool_names() {
        let names = registry(ScriptedProvider::replying("")).tool_names();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"weather-insight"));
        assert!(names.contains(&"raw-completion"));
        assert!(names.contains(&"dog-image"));
    }

    #[tokio::test]
    async fn test_registry_dispatches_by_name() {
        let registry = registry(ScriptedProvider::replying("pong"));
        let result = registry
            .call_tool("raw-completion", json!({ "message": "ping" }))
            .await
            .unwrap();

        assert_eq!(result.content.len(), 1);
        assert_eq!(first_text(&result), "pong");
    }

    #[tokio::test]
    async fn test_registry_accepts_null_arguments() {
        let provider = ScriptedProvider::replying("hi");
        let registry = registry(provider.clone());
        registry.call_tool("raw-completion", Value::Null).await.unwrap();
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_failure_is_not_an_error_result() {
        // Nothing listens on port 9, so every fetch attempt fails.
        let registry = registry(ScriptedProvider::replying("unused"));
        let result = registry
            .call_tool("weather-insight", json!({ "city": "Testville" }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        assert!(first_text(&result).starts_with("Failed to fetch weather for Testville:"));
    }

    #[tokio::test]
    async fn test_registry_call_unknown() {
        let registry = registry(ScriptedProvider::replying(""));
        let err = registry.call_tool("unknown", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn test_registry_rejects_schema_violations() {
        let registry = registry(ScriptedProvider::replying(""));
        let err = registry
            .call_tool("weather-insight", json!({ "city": 42 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = registry
            .call_tool("dog-image", json!(["beagle"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
