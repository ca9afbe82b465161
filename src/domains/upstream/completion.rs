//! LLM chat completions.
//!
//! [`CompletionProvider`] is the seam the tools talk to. The production
//! implementation, [`ChatCompletionClient`], speaks the OpenAI-compatible
//! `/chat/completions` protocol, which most providers and auth proxies accept.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::config::{CredentialsConfig, LlmConfig};
use crate::domains::tools::ToolError;

/// Longest provider error body echoed back to the caller.
const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// Something that can turn a single user prompt into text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send `prompt` as a single-turn conversation and return the first
    /// choice's text, or an empty string when the provider returned none.
    async fn complete(&self, prompt: &str) -> Result<String, ToolError>;
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// OpenAI-compatible chat completion client.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    client: Client,
    config: LlmConfig,
    credentials: CredentialsConfig,
}

impl ChatCompletionClient {
    pub fn new(client: Client, config: LlmConfig, credentials: CredentialsConfig) -> Self {
        Self {
            client,
            config,
            credentials,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionClient {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn complete(&self, prompt: &str) -> Result<String, ToolError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let mut request = self
            .client
            .post(self.endpoint())
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .json(&body);

        if let Some(api_key) = &self.credentials.llm_api_key {
            request = request.bearer_auth(api_key);
        }
        if let Some(proxy_key) = &self.credentials.proxy_api_key {
            request = request.header(self.config.proxy_header.as_str(), proxy_key.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ToolError::provider("request timed out")
            } else {
                ToolError::provider(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "Completion request rejected");
            return Err(ToolError::provider(format!(
                "HTTP {status}: {}",
                error_detail(&detail)
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ToolError::provider(format!("invalid response body: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();

        debug!(chars = text.len(), "Completion received");

        Ok(text)
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to a
/// truncated copy of the raw body.
fn error_detail(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    match message {
        Some(message) => message,
        None if body.trim().is_empty() => "empty response body".to_string(),
        None => body.trim().chars().take(MAX_ERROR_DETAIL_CHARS).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(base_url: &str, credentials: CredentialsConfig) -> ChatCompletionClient {
        let config = LlmConfig {
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            ..LlmConfig::default()
        };
        let http = Client::builder().no_proxy().build().unwrap();
        ChatCompletionClient::new(http, config, credentials)
    }

    #[tokio::test]
    async fn test_sends_single_turn_request_with_fixed_temperature() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_header("x-proxy-api-key", "proxy-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "temperature": 0.7,
                "messages": [{"role": "user", "content": "How warm is it?"}]
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Quite warm."}}]}"#)
            .create_async()
            .await;

        let credentials = CredentialsConfig {
            llm_api_key: Some("sk-test".to_string()),
            proxy_api_key: Some("proxy-test".to_string()),
        };
        let client = client_for(&format!("{}/v1/", server.url()), credentials);

        let text = client.complete("How warm is it?").await.unwrap();

        assert_eq!(text, "Quite warm.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_content_yields_empty_string() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), CredentialsConfig::default());
        assert_eq!(client.complete("hi").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_no_choices_yields_empty_string() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"id":"cmpl-1","choices":[]}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), CredentialsConfig::default());
        assert_eq!(client.complete("hi").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_auth_failure_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url(), CredentialsConfig::default());
        let err = client.complete("hi").await.unwrap_err();

        assert!(matches!(err, ToolError::Provider(_)));
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("Incorrect API key provided"));
        mock.assert_async().await;
    }

    #[test]
    fn test_error_detail_truncates_raw_bodies() {
        let long = "x".repeat(500);
        assert_eq!(error_detail(&long).len(), MAX_ERROR_DETAIL_CHARS);
        assert_eq!(error_detail("  "), "empty response body");
    }
}
