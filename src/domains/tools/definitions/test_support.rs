//! Test doubles shared by the tool, registry and server tests.

use async_trait::async_trait;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use crate::core::config::Config;
use crate::core::fetch::RetryPolicy;
use crate::domains::tools::{ToolContext, ToolError};
use crate::domains::upstream::CompletionProvider;

/// Deterministic completion provider that records every prompt.
pub struct ScriptedProvider {
    reply: Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(ToolError::provider)
    }
}

/// Config whose upstream endpoints all point at `base_url` (a mock server).
pub fn config_for(base_url: &str) -> Config {
    let mut config = Config::default();
    config.endpoints.geocoding_url = format!("{base_url}/v1/search");
    config.endpoints.forecast_url = format!("{base_url}/v1/forecast");
    config.endpoints.dog_api_url = format!("{base_url}/api");
    config.llm.base_url = base_url.to_string();
    config.fetch = RetryPolicy::new(2, 1_000, 0);
    config
}

/// Tool context over `config` with a scripted provider and no proxy.
pub fn context_with(config: Config, provider: Arc<ScriptedProvider>) -> Arc<ToolContext> {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    Arc::new(ToolContext::new(Arc::new(config), http, provider))
}
