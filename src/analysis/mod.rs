//! News-to-market relevance classification
//!
//! Two strategies produce the same [`RelevanceJudgment`]: an LLM-backed one and
//! a deterministic keyword one. The classifier tries them in a fixed order,
//! consults the cache first and rate-limits AI calls.

pub mod ai;
pub mod cache;
pub mod keyword;
pub mod rate_limit;


pub use ai::AiStrategy;
pub use cache::{cache_key, AnalysisCache};
pub use rate_limit::WindowRateLimiter;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::types::{AnalysisStats, Market, NewsAnalysis, NewsItem, NewsMarketMatch, RelevanceJudgment};
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Classification strategy, in the order the classifier will try them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Ai,
    Keyword,
}

/// Where a returned judgment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    Cached,
    Ai,
    Keyword,
}

pub struct RelevanceClassifier {
    ai: Option<AiStrategy>,
    cache: AnalysisCache,
    limiter: WindowRateLimiter,
    stats: AnalysisStats,
    min_relevance: f64,
}

impl RelevanceClassifier {
    pub fn new(ai: Option<AiStrategy>, cache: AnalysisCache, config: &AnalysisConfig) -> Self {
        Self {
            ai,
            cache,
            limiter: WindowRateLimiter::new(
                config.requests_per_window,
                Duration::from_secs(config.window_secs),
            ),
            stats: AnalysisStats::default(),
            min_relevance: config.min_relevance,
        }
    }

    /// Keyword-only classifier with an in-memory cache
    pub fn keyword_only(config: &AnalysisConfig) -> Self {
        Self::new(None, AnalysisCache::in_memory(), config)
    }

    /// Fallback order for fresh classifications
    pub fn strategies(&self) -> Vec<Strategy> {
        if self.ai.is_some() {
            vec![Strategy::Ai, Strategy::Keyword]
        } else {
            vec![Strategy::Keyword]
        }
    }

    pub fn stats(&self) -> &AnalysisStats {
        &self.stats
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Classify one (news, market) pair. Never fails: the keyword strategy is
    /// always last in line.
    pub async fn classify(
        &mut self,
        news_title: &str,
        market_id: &str,
        market_question: &str,
        outcome_names: &[String],
    ) -> (RelevanceJudgment, ClassificationSource) {
        let key = cache_key(news_title, market_id);
        self.stats.total_analyzed += 1;

        if let Some(cached) = self.cache.get(&key) {
            self.stats.cached += 1;
            return (cached.clone(), ClassificationSource::Cached);
        }

        let mut strategies = self.strategies().into_iter();
        let (judgment, source) = loop {
            match strategies.next() {
                Some(Strategy::Ai) => {
                    let Some(ai) = &self.ai else { continue };
                    self.limiter.acquire().await;
                    match ai.analyze(news_title, market_question, outcome_names).await {
                        Ok(judgment) => {
                            self.stats.ai += 1;
                            break (judgment, ClassificationSource::Ai);
                        }
                        Err(e) => {
                            warn!("AI analysis failed for market {}: {}", market_id, e);
                            self.stats.errors += 1;
                        }
                    }
                }
                // keyword matching always answers, so it ends the chain
                Some(Strategy::Keyword) | None => {
                    self.stats.keyword_fallback += 1;
                    let judgment = keyword::analyze(news_title, market_question, outcome_names);
                    break (judgment, ClassificationSource::Keyword);
                }
            }
        };

        debug!(
            "Classified market {} via {:?}: {:.1}",
            market_id, source, judgment.relevance_score
        );
        self.cache.insert(key, judgment.clone());
        (judgment, source)
    }

    /// Classify the first `max_news` items against every market with named
    /// outcomes and keep the judgments above the relevance threshold.
    pub async fn analyze_news_relevance(
        &mut self,
        news: &[NewsItem],
        markets: &[Market],
        max_news: usize,
    ) -> Result<NewsAnalysis> {
        let top_news = &news[..news.len().min(max_news)];
        info!(
            "Analyzing {} news articles against {} markets...",
            top_news.len(),
            markets.len()
        );

        let mut mapping = Vec::new();
        for (news_id, item) in top_news.iter().enumerate() {
            for market in markets {
                let outcome_names = market.outcome_names();
                if outcome_names.is_empty() {
                    continue;
                }

                let (judgment, _) = self
                    .classify(&item.title, &market.market_id, &market.question, &outcome_names)
                    .await;

                if judgment.relevance_score >= self.min_relevance {
                    mapping.push(NewsMarketMatch {
                        news_id,
                        news_title: item.title.clone(),
                        news_link: item.link.clone(),
                        market_id: market.market_id.clone(),
                        market_question: market.question.clone(),
                        market_url: market.url.clone(),
                        judgment,
                    });
                }
            }
            info!("Analyzed news {}/{}", news_id + 1, top_news.len());
        }

        self.cache.save().await?;
        info!("Analysis complete: {:?}", self.stats);

        Ok(NewsAnalysis {
            news_market_mapping: mapping,
            stats: self.stats.clone(),
            analyzed_at: Utc::now().to_rfc3339(),
        })
    }
}
