//! Tool-specific error types.

use thiserror::Error;

use crate::core::fetch::FetchError;

/// Errors that can occur during tool operations.
///
/// Pipeline failures (`Fetch`, `NotFound`, `MissingField`, `Provider`) are
/// turned into response text by the tools themselves. `InvalidArguments` and
/// `UnknownTool` are rejected at the protocol level.
#[derive(Debug, Error)]
pub enum ToolError {
    /// An upstream JSON fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The lookup returned no match.
    #[error("no match found for '{0}'")]
    NotFound(String),

    /// The upstream payload lacks a field the pipeline needs.
    #[error("upstream response is missing '{0}'")]
    MissingField(String),

    /// The LLM provider call failed.
    #[error("LLM provider error: {0}")]
    Provider(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The requested tool does not exist.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(query: impl Into<String>) -> Self {
        Self::NotFound(query.into())
    }

    /// Create a new "missing field" error.
    pub fn missing_field(path: impl Into<String>) -> Self {
        Self::MissingField(path.into())
    }

    /// Create a new provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }
}
