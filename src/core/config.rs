//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally via a `.env` file) or
//! defaults.

use super::error::{Error, Result};
use super::fetch::RetryPolicy;
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by concern for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Retry and timeout policy for upstream JSON fetches.
    pub fetch: RetryPolicy,

    /// Upstream API endpoints.
    pub endpoints: EndpointsConfig,

    /// LLM chat-completion provider settings.
    pub llm: LlmConfig,

    /// External API credentials configuration.
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Base URLs of the JSON APIs the tools read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Place-name search endpoint.
    pub geocoding_url: String,

    /// Current-conditions forecast endpoint.
    pub forecast_url: String,

    /// Dog CEO API base (without trailing `/breed`).
    pub dog_api_url: String,
}

/// Chat-completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL; `/chat/completions` is appended.
    pub base_url: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Timeout for a single completion request.
    pub timeout_ms: u64,

    /// Header carrying the auth-proxy key, if one is configured.
    pub proxy_header: String,
}

/// Configuration for external API credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// API key of the LLM provider.
    pub llm_api_key: Option<String>,

    /// Key for the auth proxy sitting in front of the provider.
    pub proxy_api_key: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "proxy_api_key",
                &self.proxy_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Read `MCP_LOG_LEVEL` and `MCP_LOG_TIMESTAMPS`.
    ///
    /// Emits no events, so it can run before a subscriber is installed.
    pub fn from_env() -> Self {
        let mut logging = Self::default();
        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            logging.level = level;
        }
        if let Ok(timestamps) = std::env::var("MCP_LOG_TIMESTAMPS") {
            logging.with_timestamps = timestamps.parse().unwrap_or(true);
        }
        logging
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            dog_api_url: "https://dog.ceo/api".to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout_ms: 30_000,
            proxy_header: "x-proxy-api-key".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "weather-insight-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig::default(),
            transport: TransportConfig::default(),
            fetch: RetryPolicy::default(),
            endpoints: EndpointsConfig::default(),
            llm: LlmConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        config.logging = LoggingConfig::from_env();

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        // Retry policy for upstream fetches
        let mut max_attempts = config.fetch.max_attempts;
        let mut timeout_ms = config.fetch.timeout_ms;
        let mut backoff_ms = config.fetch.backoff_ms;
        if let Some(v) = env_parse("MCP_FETCH_MAX_ATTEMPTS") {
            max_attempts = v;
        }
        if let Some(v) = env_parse("MCP_FETCH_TIMEOUT_MS") {
            timeout_ms = v;
        }
        if let Some(v) = env_parse("MCP_FETCH_BACKOFF_MS") {
            backoff_ms = v;
        }
        config.fetch = RetryPolicy::new(max_attempts, timeout_ms, backoff_ms);

        if let Ok(url) = std::env::var("MCP_GEOCODING_URL") {
            config.endpoints.geocoding_url = url;
        }
        if let Ok(url) = std::env::var("MCP_FORECAST_URL") {
            config.endpoints.forecast_url = url;
        }
        if let Ok(url) = std::env::var("MCP_DOG_API_URL") {
            config.endpoints.dog_api_url = url;
        }

        if let Ok(url) = std::env::var("MCP_LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("MCP_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Some(timeout) = env_parse("MCP_LLM_TIMEOUT_MS") {
            config.llm.timeout_ms = timeout;
        }
        if let Ok(header) = std::env::var("MCP_LLM_PROXY_HEADER") {
            config.llm.proxy_header = header;
        }

        // Keys are passed through as-is; a missing key shows up as an
        // authentication failure on the first completion call.
        if let Ok(api_key) = std::env::var("MCP_LLM_API_KEY") {
            config.credentials.llm_api_key = Some(api_key);
            info!("LLM API key loaded from environment");
        } else {
            warn!("MCP_LLM_API_KEY not set - completion requests will be sent unauthenticated");
        }

        if let Ok(proxy_key) = std::env::var("MCP_LLM_PROXY_KEY") {
            config.credentials.proxy_api_key = Some(proxy_key);
            info!("Auth proxy key loaded from environment");
        }

        config
    }

    /// Check that every configured endpoint is a parseable absolute URL.
    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("geocoding_url", &self.endpoints.geocoding_url),
            ("forecast_url", &self.endpoints.forecast_url),
            ("dog_api_url", &self.endpoints.dog_api_url),
            ("llm.base_url", &self.llm.base_url),
        ];

        for (field, value) in urls {
            reqwest::Url::parse(value)
                .map_err(|e| Error::config(format!("{field} '{value}' is not a valid URL: {e}")))?;
        }

        if self.llm.model.trim().is_empty() {
            return Err(Error::config("llm.model must not be empty"));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}

// Env var tests across modules must run serially.
#[cfg(test)]
pub(crate) static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
