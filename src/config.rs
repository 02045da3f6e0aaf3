//! Configuration management
//!
//! Values come from an optional TOML file, then `DASHBOARD__SECTION__KEY`
//! environment variables. Every section has defaults so an empty config runs.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gamma: GammaConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GammaConfig {
    #[serde(default = "default_gamma_url")]
    pub url: String,
    /// Events requested per fetch
    #[serde(default = "default_events_limit")]
    pub limit: usize,
    #[serde(default = "default_gamma_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,
    #[serde(default = "default_crypto_limit")]
    pub crypto_limit: usize,
    #[serde(default = "default_closing_limit")]
    pub closing_soon_limit: usize,
    #[serde(default = "default_closing_days")]
    pub closing_soon_days: i64,
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self {
            url: default_gamma_url(),
            limit: default_events_limit(),
            timeout_secs: default_gamma_timeout(),
            max_attempts: default_max_attempts(),
            trending_limit: default_trending_limit(),
            crypto_limit: default_crypto_limit(),
            closing_soon_limit: default_closing_limit(),
            closing_soon_days: default_closing_days(),
        }
    }
}

/// RSS feed source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedConfig>,
    /// How far back to keep articles
    #[serde(default = "default_news_hours")]
    pub hours: i64,
    /// Newest articles analysed against markets per run
    #[serde(default = "default_max_news")]
    pub max_analyzed: usize,
    #[serde(default = "default_news_timeout")]
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            hours: default_news_hours(),
            max_analyzed: default_max_news(),
            timeout_secs: default_news_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// anthropic | claude | openai | gpt | deepseek | ollama | compatible | custom
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// AI requests allowed per window
    #[serde(default = "default_requests_per_window")]
    pub requests_per_window: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Judgments below this score are left out of the dashboard
    #[serde(default = "default_min_relevance")]
    pub min_relevance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            requests_per_window: default_requests_per_window(),
            window_secs: default_window_secs(),
            min_relevance: default_min_relevance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_path: default_output_path(),
        }
    }
}

impl StorageConfig {
    pub fn data_dir(&self) -> PathBuf {
        expand_path(&self.data_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        expand_path(&self.output_path)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir().join("polymarket_snapshot.json")
    }

    pub fn markets_path(&self) -> PathBuf {
        self.data_dir().join("markets_with_metrics.json")
    }

    pub fn news_path(&self) -> PathBuf {
        self.data_dir().join("news_raw.json")
    }

    pub fn analysis_path(&self) -> PathBuf {
        self.data_dir().join("news_analyzed.json")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir().join("news_analysis_cache.json")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for pipeline.log; file logging is off when unset
    #[serde(default = "default_log_dir")]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

fn default_gamma_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}
fn default_events_limit() -> usize {
    500
}
fn default_gamma_timeout() -> u64 {
    30
}
fn default_max_attempts() -> u32 {
    3
}
fn default_trending_limit() -> usize {
    100
}
fn default_crypto_limit() -> usize {
    50
}
fn default_closing_limit() -> usize {
    30
}
fn default_closing_days() -> i64 {
    60
}
fn default_feeds() -> Vec<FeedConfig> {
    [
        ("chaingpt", "https://api.chaingpt.org/ai-news/rss"),
        ("cointelegraph", "https://cointelegraph.com/rss"),
        ("decrypt", "https://decrypt.co/feed"),
        ("cryptonews", "https://crypto.news/feed"),
    ]
    .into_iter()
    .map(|(name, url)| FeedConfig {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}
fn default_news_hours() -> i64 {
    48
}
fn default_max_news() -> usize {
    10
}
fn default_news_timeout() -> u64 {
    10
}
fn default_requests_per_window() -> u32 {
    50
}
fn default_window_secs() -> u64 {
    60
}
fn default_min_relevance() -> f64 {
    3.0
}
fn default_data_dir() -> String {
    "data".to_string()
}
fn default_output_path() -> String {
    "frontend/data/dashboard_data.json".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_dir() -> Option<String> {
    Some("logs".to_string())
}
fn default_port() -> u16 {
    8080
}

/// Expand `~` and environment variables in a configured path
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(path),
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("DASHBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.apply_env_fallbacks();
        Ok(config)
    }

    /// Fill the LLM section from ANTHROPIC_API_KEY when the file leaves it out
    fn apply_env_fallbacks(&mut self) {
        if self.llm.is_some() {
            return;
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.is_empty() {
                self.llm = Some(LlmConfig {
                    provider: "anthropic".to_string(),
                    api_key: key,
                    model: None,
                    base_url: None,
                });
            }
        }
    }
}
