//! HTTP clients for market data and language models

pub mod gamma;
pub mod llm;
pub mod retry;

pub use gamma::{GammaClient, GammaEvent, GammaMarket};
pub use llm::{CompletionClient, LlmClient, LlmProvider};
pub use retry::{with_retry, RetryConfig};

use crate::error::Result;
use async_trait::async_trait;

/// Source of raw market events for one pipeline run
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<GammaEvent>>;

    /// Source name for logging
    fn name(&self) -> &str;
}
