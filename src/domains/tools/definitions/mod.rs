//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod common;
pub mod dog_image;
pub mod raw_completion;
pub mod weather_insight;

#[cfg(test)]
pub(crate) mod test_support;

pub use dog_image::{DogImageParams, DogImageTool};
pub use raw_completion::{RawCompletionParams, RawCompletionTool};
pub use weather_insight::{WeatherInsightParams, WeatherInsightTool};
