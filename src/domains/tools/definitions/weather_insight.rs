//! Weather insight tool.
//!
//! Chains three upstream calls for a city: geocoding, the current
//! temperature at the resolved coordinates, and a short LLM-written comment
//! on that temperature. The first failing step ends the pipeline and its
//! error becomes the response text.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute},
    model::{CallToolResult, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{failure_text, parse_params, require_non_blank, text_result, tool_model};
use crate::domains::tools::{ToolContext, ToolError};
use crate::domains::upstream::{WeatherReading, current_temperature, resolve_location};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the weather insight tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WeatherInsightParams {
    /// City to report on.
    #[schemars(description = "City name, e.g. 'Paris' or 'San Francisco'")]
    pub city: String,
}

// ============================================================================
// Tool Implementation
// ============================================================================

/// Weather insight tool implementation.
#[derive(Debug, Clone)]
pub struct WeatherInsightTool;

impl WeatherInsightTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "weather-insight";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get the current temperature for a city together with a \
         short AI-generated insight about how the weather feels and what to wear. \
         Uses the first geocoding match for the city name.";

    /// Run the pipeline for an already validated city.
    ///
    /// Always returns text: either the insight or a description of the step
    /// that failed.
    #[instrument(skip_all, fields(city = %city))]
    pub async fn execute(city: &str, ctx: &ToolContext) -> String {
        info!("Weather insight requested");

        match Self::run_pipeline(city, ctx).await {
            Ok(text) => text,
            Err(e) => failure_text("weather", city, &e),
        }
    }

    async fn run_pipeline(city: &str, ctx: &ToolContext) -> Result<String, ToolError> {
        let endpoints = &ctx.config().endpoints;

        let location = resolve_location(ctx.fetcher(), &endpoints.geocoding_url, city).await?;
        let reading = current_temperature(ctx.fetcher(), &endpoints.forecast_url, location).await?;
        let insight = ctx
            .completions()
            .complete(&Self::insight_prompt(city, reading))
            .await?;

        Ok(Self::format_response(city, reading, &insight))
    }

    fn insight_prompt(city: &str, reading: WeatherReading) -> String {
        format!(
            "The current temperature in {city} is {}°C. In one or two sentences, describe \
             what this weather feels like and suggest what to wear.",
            reading.temperature_celsius
        )
    }

    fn format_response(city: &str, reading: WeatherReading, insight: &str) -> String {
        let headline = format!(
            "The current temperature in {city} is {}°C.",
            reading.temperature_celsius
        );
        match insight.trim() {
            "" => headline,
            insight => format!("{headline} {insight}"),
        }
    }

    /// Validate arguments and run the tool (shared by every transport).
    pub async fn call(arguments: JsonObject, ctx: &ToolContext) -> Result<CallToolResult, ToolError> {
        let params: WeatherInsightParams = parse_params(arguments)?;
        let city = require_non_blank("city", &params.city)?;
        Ok(text_result(Self::execute(city, ctx).await))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        tool_model::<WeatherInsightParams>(Self::NAME, Self::DESCRIPTION)
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

// ============================================================================
// Tests
// ============================================================================
