//! Resilient JSON fetching for upstream APIs.
//!
//! Every upstream GET made by the tools goes through [`ResilientFetcher`].
//! Each attempt is bounded by a timeout; failed attempts (timeouts, transport
//! errors, non-2xx statuses) are retried up to a fixed count with a constant
//! pause in between. A 2xx body that is not valid JSON ends the call at once.

use reqwest::{Client, Url, header::ACCEPT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Default number of attempts per fetch.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default pause between failed attempts.
pub const DEFAULT_BACKOFF_MS: u64 = 500;

/// Retry and timeout policy applied to every upstream fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one (at least 1).
    pub max_attempts: u32,

    /// Upper bound for a single attempt, in milliseconds (at least 1).
    pub timeout_ms: u64,

    /// Fixed pause between failed attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl RetryPolicy {
    /// Build a policy, clamping `max_attempts` and `timeout_ms` to at least 1.
    pub fn new(max_attempts: u32, timeout_ms: u64, backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            timeout_ms: timeout_ms.max(1),
            backoff_ms,
        }
    }

    /// Attempt budget. Deserialized policies skip `new`, so clamp here too.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_MS, DEFAULT_BACKOFF_MS)
    }
}

/// Why a single attempt failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// No complete response within the per-attempt timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The server answered outside the 2xx range.
    #[error("HTTP {status} {reason}")]
    Status { status: u16, reason: String },

    /// Connection or protocol failure before a status was received.
    #[error("network error: {0}")]
    Network(String),
}

/// Errors returned by [`ResilientFetcher::fetch_json`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt failed; `last` is the final failure.
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: AttemptError },

    /// A 2xx response whose body is not valid JSON.
    #[error("invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },

    /// The request URL could not be built.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Create an "invalid URL" error.
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }
}

/// HTTP GET helper with bounded attempts and per-attempt timeouts.
///
/// Cloning is cheap: the underlying `reqwest::Client` shares its
/// connection pool.
#[derive(Debug, Clone)]
pub struct ResilientFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl ResilientFetcher {
    /// Create a fetcher on top of an existing client.
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// The policy this fetcher applies.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `url` and parse the body as JSON.
    ///
    /// Performs at most `policy.max_attempts` attempts, and exactly that many
    /// when every attempt fails.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_json(&self, url: Url) -> Result<serde_json::Value, FetchError> {
        let max_attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            match self.attempt(&url).await {
                Ok(body) => {
                    return serde_json::from_str(&body).map_err(|e| FetchError::Decode {
                        url: url.to_string(),
                        message: e.to_string(),
                    });
                }
                Err(err) => {
                    warn!(attempt, max_attempts, error = %err, "Fetch attempt failed");

                    if attempt >= max_attempts {
                        return Err(FetchError::Exhausted {
                            attempts: attempt,
                            last: err,
                        });
                    }

                    debug!(
                        backoff_ms = self.policy.backoff_ms,
                        next_attempt = attempt + 1,
                        "Retrying after backoff"
                    );
                    tokio::time::sleep(self.policy.backoff()).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One bounded attempt: send, check status, read the body.
    async fn attempt(&self, url: &Url) -> Result<String, AttemptError> {
        let request = async {
            let response = self
                .client
                .get(url.clone())
                .header(ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| AttemptError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(AttemptError::Status {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                });
            }

            response
                .text()
                .await
                .map_err(|e| AttemptError::Network(e.to_string()))
        };

        match tokio::time::timeout(self.policy.timeout(), request).await {
            Ok(result) => result,
            Err(_) => Err(AttemptError::Timeout(self.policy.timeout_ms)),
        }
    }
}
