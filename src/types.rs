//! Core types shared by the scorer, classifier and aggregator

use serde::{Deserialize, Serialize};

/// Risk bucket of a single outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Medium,
    Low,
    Extreme,
    Safe,
    Other,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Medium => "medium",
            RiskCategory::Low => "low",
            RiskCategory::Extreme => "extreme",
            RiskCategory::Safe => "safe",
            RiskCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk/reward metrics for one outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub score: f64,
    pub multiplier: f64,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    pub volume_weight: f64,
    pub risk_category: RiskCategory,
}

/// Market outcome with its derived metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub price: f64,
    pub probability: f64,
    pub volume: f64,
    pub risk_metrics: RiskMetrics,
}

/// Enriched market as consumed by the classifier and aggregator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Market {
    pub question: String,
    pub url: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    #[serde(default)]
    pub event_title: String,
    pub market_id: String,
    #[serde(default)]
    pub image: String,
    /// Selection buckets the parent event was picked from
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Market {
    /// Names of outcomes that carry a non-empty label
    pub fn outcome_names(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| !o.name.is_empty())
            .map(|o| o.name.clone())
            .collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Single news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactDirection {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Which strategy produced a judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMethod {
    #[serde(rename = "ai", alias = "claude_ai")]
    Ai,
    #[serde(rename = "keyword_fallback")]
    KeywordFallback,
}

/// Verdict on whether a headline affects a market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceJudgment {
    pub relevance_score: f64,
    pub affects_outcomes: Vec<String>,
    pub impact_direction: ImpactDirection,
    pub confidence: Confidence,
    pub reasoning: String,
    pub analysis_method: AnalysisMethod,
}

/// A judgment that passed the relevance threshold, tied to its news item and market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsMarketMatch {
    pub news_id: usize,
    pub news_title: String,
    pub news_link: String,
    pub market_id: String,
    pub market_question: String,
    pub market_url: String,
    #[serde(flatten)]
    pub judgment: RelevanceJudgment,
}

/// Counters for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total_analyzed: usize,
    pub ai: usize,
    pub keyword_fallback: usize,
    pub errors: usize,
    pub cached: usize,
}

/// Result of analysing a batch of news against all markets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsAnalysis {
    pub news_market_mapping: Vec<NewsMarketMatch>,
    pub stats: AnalysisStats,
    pub analyzed_at: String,
}
