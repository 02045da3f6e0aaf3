//! Five-step dashboard pipeline
//!
//! fetch markets -> score outcomes -> fetch news -> classify relevance ->
//! build and publish the payload. Steps run sequentially; a failed or empty
//! market fetch, or a news source that fails outright, aborts before anything
//! is published.

use crate::aggregator::{self, DashboardData};
use crate::analysis::{AiStrategy, AnalysisCache, RelevanceClassifier};
use crate::client::{CompletionClient, GammaClient, LlmClient, MarketSource};
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::news::{FileNewsSource, NewsSnapshot, NewsSource, RssNewsFetcher};
use crate::risk;
use crate::storage::{self, MarketSnapshot};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Per-invocation switches from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip the AI strategy even when an LLM is configured
    pub keyword_only: bool,
    /// Read news from this JSON file instead of the RSS feeds
    pub news_file: Option<PathBuf>,
}

pub struct Pipeline {
    config: Config,
    markets: Box<dyn MarketSource>,
    news: Box<dyn NewsSource>,
    llm: Option<Arc<dyn CompletionClient>>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        markets: Box<dyn MarketSource>,
        news: Box<dyn NewsSource>,
        llm: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        Self {
            config,
            markets,
            news,
            llm,
        }
    }

    /// Wire the live Gamma, news and LLM clients from configuration
    pub fn from_config(config: Config, options: &RunOptions) -> Result<Self> {
        let markets = Box::new(GammaClient::new(config.gamma.clone())?);

        let news: Box<dyn NewsSource> = match &options.news_file {
            Some(path) => Box::new(FileNewsSource::new(path.clone())),
            None => Box::new(RssNewsFetcher::new(&config.news)?),
        };

        let llm: Option<Arc<dyn CompletionClient>> = match (&config.llm, options.keyword_only) {
            (_, true) => {
                info!("Keyword-only mode: AI analysis disabled");
                None
            }
            (Some(llm_config), false) => match LlmClient::from_config(llm_config) {
                Ok(client) => {
                    info!("LLM client initialized: {}", client.name());
                    Some(Arc::new(client))
                }
                Err(e) => {
                    warn!("Failed to initialize LLM client, using keyword matching only: {}", e);
                    None
                }
            },
            (None, false) => {
                warn!("No LLM configured, using keyword matching only");
                None
            }
        };

        Ok(Self::new(config, markets, news, llm))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run all five steps and publish the payload
    pub async fn run(&self) -> Result<DashboardData> {
        let started = Instant::now();
        info!("{}", "=".repeat(60));
        info!("Polymarket Dashboard Pipeline Started");
        info!("{}", "=".repeat(60));

        match self.run_steps().await {
            Ok(data) => {
                info!("{}", "=".repeat(60));
                info!(
                    "Pipeline completed successfully in {:.1}s",
                    started.elapsed().as_secs_f64()
                );
                info!("{}", "=".repeat(60));
                Ok(data)
            }
            Err(e) => {
                error!("Pipeline failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run_steps(&self) -> Result<DashboardData> {
        let storage_config = &self.config.storage;

        info!("[1/5] Fetching Polymarket markets from {}...", self.markets.name());
        let events = self.markets.fetch_events().await?;
        if events.is_empty() {
            error!("No markets fetched, aborting pipeline");
            return Err(DashboardError::NoMarkets);
        }
        storage::save_json(&storage_config.snapshot_path(), &MarketSnapshot::new(events.clone())).await?;
        info!("Fetched {} events", events.len());

        info!("[2/5] Calculating risk metrics...");
        let markets = risk::enrich_markets(&events);
        if markets.is_empty() {
            error!("No markets with parseable outcomes, aborting pipeline");
            return Err(DashboardError::NoMarkets);
        }
        storage::save_json(&storage_config.markets_path(), &MarketSnapshot::new(markets.clone())).await?;
        info!("Enriched {} markets with risk scores", markets.len());

        let hours = self.config.news.hours;
        info!("[3/5] Fetching crypto news (last {}h) from {}...", hours, self.news.name());
        let news = self.news.fetch_news(hours).await.map_err(|e| {
            error!("News fetch from {} failed, aborting pipeline: {}", self.news.name(), e);
            e
        })?;
        storage::save_json(&storage_config.news_path(), &NewsSnapshot::new(news.clone())).await?;
        info!("Fetched {} news articles", news.len());

        info!("[4/5] Analyzing news relevance...");
        let cache = AnalysisCache::load(storage_config.cache_path()).await;
        let ai = self.llm.clone().map(AiStrategy::new);
        let mut classifier = RelevanceClassifier::new(ai, cache, &self.config.analysis);
        let analysis = classifier
            .analyze_news_relevance(&news, &markets, self.config.news.max_analyzed)
            .await?;
        storage::save_json(&storage_config.analysis_path(), &analysis).await?;
        info!("Analyzed {} news-market pairs", analysis.stats.total_analyzed);
        info!("  - AI: {}", analysis.stats.ai);
        info!("  - Keyword fallback: {}", analysis.stats.keyword_fallback);
        info!("  - Errors: {}", analysis.stats.errors);
        info!("  - Cached: {}", analysis.stats.cached);

        info!("[5/5] Building dashboard data...");
        let data = aggregator::build_dashboard(&markets, &analysis);
        let output = storage_config.output_path();
        storage::save_json(&output, &data).await?;
        info!("Dashboard data saved to {}", output.display());

        Ok(data)
    }
}
