//! Dashboard payload assembly
//!
//! Pure functions over enriched markets and the news analysis. Ranking is
//! always a stable sort, so equal scores keep their traversal order.

pub mod closing;


pub use closing::{closing_soon_candidates, closing_soon_report, ClosingCandidate, ClosingCriteria};

use crate::client::gamma::{TAG_CRYPTO, TAG_TRENDING};
use crate::types::{
    Confidence, ImpactDirection, Market, NewsAnalysis, NewsMarketMatch, RiskCategory,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::info;

pub const RISK_WIDGET_SIZE: usize = 5;
pub const NEWS_WIDGET_SIZE: usize = 10;

/// One outcome shown in a risk widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskOpportunity {
    pub market_title: String,
    pub market_url: String,
    pub market_end_date: Option<String>,
    pub outcome_name: String,
    pub probability: f64,
    pub multiplier: f64,
    pub score: f64,
    pub risk_category: RiskCategory,
    pub volume: f64,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskWidget {
    pub medium_risk: Vec<RiskOpportunity>,
    pub low_risk: Vec<RiskOpportunity>,
}

/// Best news item for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsFeedEntry {
    pub news_title: String,
    pub news_link: String,
    pub market_title: String,
    pub market_url: String,
    pub relevance_score: f64,
    pub affects_outcomes: Vec<String>,
    pub impact_direction: ImpactDirection,
    pub confidence: Confidence,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widgets {
    pub risk_categories: RiskWidget,
    pub news_feed: Vec<NewsFeedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetadata {
    pub total_markets: usize,
    pub trending_count: usize,
    pub crypto_count: usize,
    pub news_analyzed: usize,
    pub snapshot_time: String,
}

/// Payload consumed by the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub generated_at: String,
    pub widgets: Widgets,
    pub metadata: DashboardMetadata,
}

fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Top medium- and low-risk outcomes across all markets
pub fn build_risk_widget(markets: &[Market]) -> RiskWidget {
    let mut widget = RiskWidget::default();

    for market in markets {
        for outcome in &market.outcomes {
            let category = outcome.risk_metrics.risk_category;
            let bucket = match category {
                RiskCategory::Medium => &mut widget.medium_risk,
                RiskCategory::Low => &mut widget.low_risk,
                _ => continue,
            };
            bucket.push(RiskOpportunity {
                market_title: market.question.clone(),
                market_url: market.url.clone(),
                market_end_date: market.end_date.clone(),
                outcome_name: outcome.name.clone(),
                probability: outcome.probability,
                multiplier: outcome.risk_metrics.multiplier,
                score: outcome.risk_metrics.score,
                risk_category: category,
                volume: outcome.volume,
                image: market.image.clone(),
            });
        }
    }

    for bucket in [&mut widget.medium_risk, &mut widget.low_risk] {
        bucket.sort_by(|a, b| by_score_desc(a.score, b.score));
        bucket.truncate(RISK_WIDGET_SIZE);
    }

    widget
}

/// Most relevant news item per market, best markets first
pub fn build_news_widget(matches: &[NewsMarketMatch], markets: &[Market]) -> Vec<NewsFeedEntry> {
    // market id -> best match, in first-appearance order
    let mut order: Vec<&str> = Vec::new();
    let mut best: HashMap<&str, &NewsMarketMatch> = HashMap::new();

    for item in matches {
        let id = item.market_id.as_str();
        let replace = match best.get(id) {
            None => {
                order.push(id);
                true
            }
            Some(current) => item.judgment.relevance_score > current.judgment.relevance_score,
        };
        if replace {
            best.insert(id, item);
        }
    }

    let mut feed: Vec<NewsFeedEntry> = order
        .into_iter()
        .filter_map(|id| {
            let item = best.get(id)?;
            let market = markets.iter().find(|m| m.market_id == id)?;
            Some(NewsFeedEntry {
                news_title: item.news_title.clone(),
                news_link: item.news_link.clone(),
                market_title: market.question.clone(),
                market_url: market.url.clone(),
                relevance_score: item.judgment.relevance_score,
                affects_outcomes: item.judgment.affects_outcomes.clone(),
                impact_direction: item.judgment.impact_direction,
                confidence: item.judgment.confidence,
                reasoning: item.judgment.reasoning.clone(),
            })
        })
        .collect();

    feed.sort_by(|a, b| by_score_desc(a.relevance_score, b.relevance_score));
    feed.truncate(NEWS_WIDGET_SIZE);
    feed
}

pub fn build_dashboard(markets: &[Market], analysis: &NewsAnalysis) -> DashboardData {
    build_dashboard_at(markets, analysis, Utc::now())
}

/// Build the payload with an explicit timestamp
pub fn build_dashboard_at(markets: &[Market], analysis: &NewsAnalysis, now: DateTime<Utc>) -> DashboardData {
    info!("Building dashboard data...");

    let risk_categories = build_risk_widget(markets);
    let news_feed = build_news_widget(&analysis.news_market_mapping, markets);
    let timestamp = now.to_rfc3339();

    info!(
        "  Risk categories: {} medium, {} low",
        risk_categories.medium_risk.len(),
        risk_categories.low_risk.len()
    );
    info!("  News feed: {} articles", news_feed.len());

    DashboardData {
        generated_at: timestamp.clone(),
        widgets: Widgets {
            risk_categories,
            news_feed,
        },
        metadata: DashboardMetadata {
            total_markets: markets.len(),
            trending_count: markets.iter().filter(|m| m.has_tag(TAG_TRENDING)).count(),
            crypto_count: markets.iter().filter(|m| m.has_tag(TAG_CRYPTO)).count(),
            news_analyzed: analysis.stats.total_analyzed,
            snapshot_time: timestamp,
        },
    }
}
