//! Upstream API steps.
//!
//! Each module wraps one external service the tools depend on:
//!
//! - `geocode`: place name → coordinates
//! - `forecast`: coordinates → current temperature
//! - `completion`: prompt → LLM text
//! - `dog`: breed → random image URL
//!
//! JSON GETs go through [`crate::core::fetch::ResilientFetcher`]; the
//! completion call is a single attempt.

pub mod completion;
pub mod dog;
pub mod forecast;
pub mod geocode;

pub use completion::{ChatCompletionClient, CompletionProvider};
pub use forecast::{WeatherReading, current_temperature};
pub use geocode::{GeoLocation, resolve_location};
