//! Common utilities shared across tools.
//!
//! Argument parsing, tool metadata and the single-text-item response
//! envelope every tool returns.

use rmcp::{
    handler::server::tool::cached_schema_for_type,
    model::{CallToolResult, Content, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::domains::tools::ToolError;

/// Deserialize tool arguments into the tool's parameter struct.
pub fn parse_params<T: DeserializeOwned>(arguments: JsonObject) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::Object(arguments))
        .map_err(|e| ToolError::invalid_arguments(e.to_string()))
}

/// Reject blank values for a required string argument.
pub fn require_non_blank<'a>(field: &str, value: &'a str) -> Result<&'a str, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid_arguments(format!(
            "'{field}' must not be empty"
        )));
    }
    Ok(trimmed)
}

/// Wrap text as the one content item of a tool response.
///
/// Failures are reported through this same envelope, so `is_error` stays
/// false for both outcomes.
pub fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

/// Log a pipeline failure and render it for the caller.
pub fn failure_text(subject: &str, input: &str, err: &ToolError) -> String {
    error!(subject, input, error = %err, "Tool pipeline failed");
    format!("Failed to fetch {subject} for {input}: {err}")
}

/// Build the Tool model (metadata) for a parameter type.
pub fn tool_model<P: JsonSchema + 'static>(name: &'static str, description: &'static str) -> Tool {
    Tool {
        name: name.into(),
        description: Some(description.into()),
        input_schema: cached_schema_for_type::<P>(),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Params {
        city: String,
    }

    #[test]
    fn test_parse_params_reports_missing_field() {
        let err = parse_params::<Params>(JsonObject::new()).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(ref m) if m.contains("city")));
    }

    #[test]
    fn test_parse_params_accepts_valid_object() {
        let mut args = JsonObject::new();
        args.insert("city".into(), "Lyon".into());
        let params: Params = parse_params(args).unwrap();
        assert_eq!(params.city, "Lyon");
    }

    #[test]
    fn test_require_non_blank() {
        assert_eq!(require_non_blank("city", "  Oslo ").unwrap(), "Oslo");
        assert!(require_non_blank("city", "   ").is_err());
    }

    #[test]
    fn test_failure_text_format() {
        let err = ToolError::not_found("Atlantis");
        assert_eq!(
            failure_text("weather", "Atlantis", &err),
            "Failed to fetch weather for Atlantis: no match found for 'Atlantis'"
        );
    }

    #[test]
    fn test_text_result_is_single_non_error_item() {
        let result = text_result("hello".to_string());
        assert_eq!(result.content.len(), 1);
        assert_ne!(result.is_error, Some(true));
    }
}
