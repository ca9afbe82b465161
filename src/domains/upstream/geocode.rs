//! Place-name geocoding.
//!
//! Resolves a free-text city name to coordinates using an Open-Meteo
//! compatible search endpoint. Only the first match is used.

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::fetch::{FetchError, ResilientFetcher};
use crate::domains::tools::ToolError;

/// Coordinates of a resolved place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Look up `city` and return the coordinates of the first result.
///
/// Fails with [`ToolError::NotFound`] when the result list is empty or absent.
#[instrument(skip(fetcher, endpoint))]
pub async fn resolve_location(
    fetcher: &ResilientFetcher,
    endpoint: &str,
    city: &str,
) -> Result<GeoLocation, ToolError> {
    let url = Url::parse_with_params(
        endpoint,
        &[
            ("name", city),
            ("count", "1"),
            ("language", "en"),
            ("format", "json"),
        ],
    )
    .map_err(|e| FetchError::invalid_url(format!("{endpoint}: {e}")))?;

    let body = fetcher.fetch_json(url).await?;

    let first = body
        .get("results")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .ok_or_else(|| ToolError::not_found(city))?;

    let latitude = first
        .get("latitude")
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::missing_field("results[0].latitude"))?;
    let longitude = first
        .get("longitude")
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::missing_field("results[0].longitude"))?;

    debug!(latitude, longitude, "Resolved location");

    Ok(GeoLocation {
        latitude,
        longitude,
    })
}
