//! Current temperature lookup.

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::geocode::GeoLocation;
use crate::core::fetch::{FetchError, ResilientFetcher};
use crate::domains::tools::ToolError;

/// JSON pointer of the field read from the forecast payload.
const TEMPERATURE_POINTER: &str = "/current_weather/temperature";

/// Current conditions at a location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherReading {
    pub temperature_celsius: f64,
}

/// Fetch the current temperature at `location`.
#[instrument(skip(fetcher, endpoint))]
pub async fn current_temperature(
    fetcher: &ResilientFetcher,
    endpoint: &str,
    location: GeoLocation,
) -> Result<WeatherReading, ToolError> {
    let latitude = location.latitude.to_string();
    let longitude = location.longitude.to_string();

    let url = Url::parse_with_params(
        endpoint,
        &[
            ("latitude", latitude.as_str()),
            ("longitude", longitude.as_str()),
            ("current_weather", "true"),
        ],
    )
    .map_err(|e| FetchError::invalid_url(format!("{endpoint}: {e}")))?;

    let body = fetcher.fetch_json(url).await?;

    let temperature_celsius = body
        .pointer(TEMPERATURE_POINTER)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::missing_field("current_weather.temperature"))?;

    debug!(temperature_celsius, "Fetched current temperature");

    Ok(WeatherReading {
        temperature_celsius,
    })
}
