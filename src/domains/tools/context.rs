//! Shared dependencies handed to every tool invocation.

use std::sync::Arc;
use tracing::info;

use crate::core::config::Config;
use crate::core::fetch::ResilientFetcher;
use crate::domains::upstream::{ChatCompletionClient, CompletionProvider};

/// Everything a tool pipeline needs: configuration, the retrying JSON
/// fetcher and the completion provider.
///
/// Built once per server and shared behind an `Arc`; nothing in here is
/// mutated after construction.
pub struct ToolContext {
    config: Arc<Config>,
    fetcher: ResilientFetcher,
    completions: Arc<dyn CompletionProvider>,
}

impl ToolContext {
    /// Build the production context: one pooled HTTP client shared by the
    /// fetcher and the chat-completion client.
    pub fn from_config(config: Arc<Config>) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let completions = Arc::new(ChatCompletionClient::new(
            http.clone(),
            config.llm.clone(),
            config.credentials.clone(),
        ));

        Ok(Self::new(config, http, completions))
    }

    /// Assemble a context from explicit parts.
    pub fn new(
        config: Arc<Config>,
        http: reqwest::Client,
        completions: Arc<dyn CompletionProvider>,
    ) -> Self {
        let fetcher = ResilientFetcher::new(http, config.fetch);
        let policy = fetcher.policy();
        info!(
            max_attempts = policy.max_attempts,
            timeout_ms = policy.timeout_ms,
            backoff_ms = policy.backoff_ms,
            model = %config.llm.model,
            "Tool context ready"
        );

        Self {
            config,
            fetcher,
            completions,
        }
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn fetcher(&self) -> &ResilientFetcher {
        &self.fetcher
    }

    pub fn completions(&self) -> &dyn CompletionProvider {
        self.completions.as_ref()
    }
}
