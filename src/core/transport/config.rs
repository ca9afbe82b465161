//! Transport configuration types.

use serde::{Deserialize, Serialize};
#[cfg(feature = "sse")]
use tracing::warn;

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport.
    #[cfg(feature = "stdio")]
    Stdio,

    /// HTTP server streaming responses over Server-Sent Events.
    #[cfg(feature = "sse")]
    Sse(SseConfig),
}

/// SSE transport configuration.
#[cfg(feature = "sse")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseConfig {
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path clients open the event stream on.
    #[serde(default = "default_sse_path")]
    pub sse_path: String,

    /// Path clients POST JSON-RPC messages to.
    #[serde(default = "default_message_path")]
    pub message_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

#[cfg(feature = "sse")]
fn default_port() -> u16 {
    3000
}

#[cfg(feature = "sse")]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[cfg(feature = "sse")]
fn default_sse_path() -> String {
    "/sse".to_string()
}

#[cfg(feature = "sse")]
fn default_message_path() -> String {
    "/messages".to_string()
}

#[cfg(feature = "sse")]
fn default_cors() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "sse")]
        {
            return Self::Sse(SseConfig::default());
        }

        #[cfg(all(not(feature = "sse"), feature = "stdio"))]
        {
            return Self::Stdio;
        }

        #[cfg(not(any(feature = "stdio", feature = "sse")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or sse");
        }
    }
}

#[cfg(feature = "sse")]
impl Default for SseConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            sse_path: default_sse_path(),
            message_path: default_message_path(),
            enable_cors: default_cors(),
        }
    }
}

#[cfg(feature = "sse")]
impl SseConfig {
    /// Load SSE settings from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let port = match std::env::var("MCP_SSE_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid MCP_SSE_PORT value '{}'", raw);
                default_port()
            }),
            Err(_) => default_port(),
        };

        Self {
            port,
            host: std::env::var("MCP_SSE_HOST").unwrap_or_else(|_| default_host()),
            sse_path: std::env::var("MCP_SSE_PATH").unwrap_or_else(|_| default_sse_path()),
            message_path: std::env::var("MCP_MESSAGE_PATH")
                .unwrap_or_else(|_| default_message_path()),
            enable_cors: std::env::var("MCP_SSE_CORS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

impl TransportConfig {
    /// Create a STDIO transport config.
    #[cfg(feature = "stdio")]
    pub fn stdio() -> Self {
        Self::Stdio
    }

    /// Create an SSE transport config.
    #[cfg(feature = "sse")]
    pub fn sse(port: u16, host: impl Into<String>) -> Self {
        Self::Sse(SseConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Load transport config from environment variables.
    ///
    /// `MCP_TRANSPORT` selects the transport; anything unrecognised falls
    /// back to the default.
    pub fn from_env() -> Self {
        let transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Self::Stdio,
            #[cfg(feature = "sse")]
            "sse" | "http" => Self::Sse(SseConfig::from_env()),
            #[cfg(feature = "sse")]
            _ => Self::Sse(SseConfig::from_env()),
            #[cfg(all(not(feature = "sse"), feature = "stdio"))]
            _ => Self::Stdio,
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "sse")]
            Self::Sse(cfg) => format!(
                "SSE on {}:{} (stream {}, messages {})",
                cfg.host, cfg.port, cfg.sse_path, cfg.message_path
            ),
        }
    }
}
