//! Dog image tool.

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
use crate::domains::upstream::dog::random_image;

/// Parameters for the dog image tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DogImageParams {
    /// Breed name.
    #[schemars(description = "Dog breed, e.g. 'beagle' or 'hound'")]
    pub breed: String,

    /// Optional sub-breed.
    #[serde(default)]
    #[schemars(description = "Optional sub-breed, e.g. 'afghan' for breed 'hound'")]
    pub sub_breed: Option<String>,
}

/// Dog image tool implementation.
#[derive(Debug, Clone)]
pub struct DogImageTool;

impl DogImageTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "dog-image";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Get a link to a random picture of the given dog breed from the Dog CEO API.";

    #[instrument(skip_all, fields(breed = %breed))]
    pub async fn execute(breed: &str, sub_breed: Option<&str>, ctx: &ToolContext) -> String {
        info!("Dog image requested");

        let base_url = &ctx.config().endpoints.dog_api_url;
        match random_image(ctx.fetcher(), base_url, breed, sub_breed).await {
            Ok(url) => format!("Your dog image is here: {url}"),
            Err(e) => {
                let subject = match sub_breed {
                    Some(sub_breed) => format!("{breed}/{sub_breed}"),
                    None => breed.to_string(),
                };
                failure_text("dog image", &subject, &e)
            }
        }
    }

    /// Validate arguments and run the tool (shared by every transport).
    pub async fn call(arguments: JsonObject, ctx: &ToolContext) -> Result<CallToolResult, ToolError> {
        let params: DogImageParams = parse_params(arguments)?;
        let breed = require_non_blank("breed", &params.breed)?;
        let sub_breed = params
            .sub_breed
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        Ok(text_result(Self::execute(breed, sub_breed, ctx).await))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        tool_model::<DogImageParams>(Self::NAME, Self::DESCRIPTION)
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
