//! Chat-completion client for the supported LLM providers

use crate::config::LlmConfig;
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const ANTHROPIC_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
const MAX_TOKENS: u32 = 500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Transport that turns a prompt into the model's text reply
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model name for logging
    fn name(&self) -> String;
}

/// LLM provider with its credentials
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Anthropic {
        api_key: String,
        model: String,
    },
    OpenAI {
        api_key: String,
        model: String,
        base_url: String,
    },
    DeepSeek {
        api_key: String,
        model: String,
    },
    /// Any OpenAI-compatible endpoint (Ollama, vLLM, ...)
    Compatible {
        api_key: Option<String>,
        model: String,
        base_url: String,
    },
}

impl LlmProvider {
    fn model(&self) -> &str {
        match self {
            LlmProvider::Anthropic { model, .. }
            | LlmProvider::OpenAI { model, .. }
            | LlmProvider::DeepSeek { model, .. }
            | LlmProvider::Compatible { model, .. } => model,
        }
    }
}

/// HTTP client for one configured provider
pub struct LlmClient {
    http: Client,
    provider: LlmProvider,
}

impl LlmClient {
    pub fn new(provider: LlmProvider) -> Result<Self> {
        Self::with_timeout(provider, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(provider: LlmProvider, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, provider })
    }

    pub fn anthropic(api_key: String) -> Result<Self> {
        Self::new(LlmProvider::Anthropic {
            api_key,
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
        })
    }

    pub fn openai(api_key: String) -> Result<Self> {
        Self::new(LlmProvider::OpenAI {
            api_key,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com".to_string(),
        })
    }

    pub fn deepseek(api_key: String) -> Result<Self> {
        Self::new(LlmProvider::DeepSeek {
            api_key,
            model: "deepseek-chat".to_string(),
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let provider = match config.provider.to_lowercase().as_str() {
            "anthropic" | "claude" => LlmProvider::Anthropic {
                api_key: config.api_key.clone(),
                model: config
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            },
            "openai" | "gpt" => LlmProvider::OpenAI {
                api_key: config.api_key.clone(),
                model: config.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string()),
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com".to_string()),
            },
            "deepseek" => LlmProvider::DeepSeek {
                api_key: config.api_key.clone(),
                model: config.model.clone().unwrap_or_else(|| "deepseek-chat".to_string()),
            },
            "ollama" => LlmProvider::Compatible {
                api_key: None,
                model: config.model.clone().unwrap_or_else(|| "qwen2.5:14b".to_string()),
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string()),
            },
            "compatible" | "custom" => LlmProvider::Compatible {
                api_key: Some(config.api_key.clone()).filter(|k| !k.is_empty()),
                model: config
                    .model
                    .clone()
                    .ok_or_else(|| DashboardError::Config("compatible provider requires model".into()))?,
                base_url: config
                    .base_url
                    .clone()
                    .ok_or_else(|| DashboardError::Config("compatible provider requires base_url".into()))?,
            },
            other => {
                return Err(DashboardError::Config(format!("Unknown LLM provider: {}", other)));
            }
        };

        Self::new(provider)
    }

    async fn call_anthropic(&self, api_key: &str, model: &str, prompt: &str) -> Result<String> {
        let request = json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "messages": [{"role": "user", "content": prompt}]
        });

        let resp = self
            .http
            .post(format!("{}/v1/messages", ANTHROPIC_URL))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let body: Value = super::retry::check_status(resp).await?.json().await?;

        body["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| DashboardError::Llm("Empty Anthropic response".into()))
    }

    async fn call_openai_style(
        &self,
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        prompt: &str,
    ) -> Result<String> {
        let request = json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "messages": [{"role": "user", "content": prompt}],
            "response_format": {"type": "json_object"}
        });

        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", base_url.trim_end_matches('/')))
            .header("content-type", "application/json");

        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.json(&request).send().await?;
        let body: Value = super::retry::check_status(resp).await?.json().await?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| DashboardError::Llm("Empty LLM response".into()))
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("LLM request to {} ({} chars)", self.provider.model(), prompt.len());
        match &self.provider {
            LlmProvider::Anthropic { api_key, model } => self.call_anthropic(api_key, model, prompt).await,
            LlmProvider::OpenAI {
                api_key,
                model,
                base_url,
            } => {
                self.call_openai_style(base_url, Some(api_key), model, prompt)
                    .await
            }
            LlmProvider::DeepSeek { api_key, model } => {
                self.call_openai_style("https://api.deepseek.com", Some(api_key), model, prompt)
                    .await
            }
            LlmProvider::Compatible {
                api_key,
                model,
                base_url,
            } => {
                self.call_openai_style(base_url, api_key.as_deref(), model, prompt)
                    .await
            }
        }
    }

    fn name(&self) -> String {
        self.provider.model().to_string()
    }
}
