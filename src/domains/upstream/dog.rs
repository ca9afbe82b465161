//! Random dog images from the Dog CEO API.

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::fetch::{FetchError, ResilientFetcher};
use crate::domains::tools::ToolError;

/// Fetch a random image URL for `breed` (and optionally `sub_breed`).
///
/// Breed names are case-insensitive on our side and sent lowercase, each as
/// its own escaped path segment.
#[instrument(skip(fetcher, base_url))]
pub async fn random_image(
    fetcher: &ResilientFetcher,
    base_url: &str,
    breed: &str,
    sub_breed: Option<&str>,
) -> Result<String, ToolError> {
    let mut url =
        Url::parse(base_url).map_err(|e| FetchError::invalid_url(format!("{base_url}: {e}")))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| FetchError::invalid_url(format!("{base_url} cannot be a base URL")))?;
        segments
            .pop_if_empty()
            .push("breed")
            .push(&breed.trim().to_lowercase());
        if let Some(sub_breed) = sub_breed {
            segments.push(&sub_breed.trim().to_lowercase());
        }
        segments.push("images").push("random");
    }

    let body = fetcher.fetch_json(url).await?;

    let image = body
        .get("message")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::missing_field("message"))?;

    debug!(image, "Fetched dog image");

    Ok(image.to_string())
}
