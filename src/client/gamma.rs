//! Gamma API client for market data
//!
//! Fetches active events and picks the subsets shown on the dashboard:
//! trending (by 24h volume), crypto (by keyword) and closing soon.

use super::retry::{check_status, with_retry, RetryConfig};
use super::MarketSource;
use crate::config::GammaConfig;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};

pub const TAG_TRENDING: &str = "trending";
pub const TAG_CRYPTO: &str = "crypto";
pub const TAG_CLOSING_SOON: &str = "closing_soon";

/// Keywords that mark an event as crypto related
pub const CRYPTO_KEYWORDS: &[&str] = &[
    "bitcoin", "btc", "ethereum", "eth", "crypto", "solana", "sol", "xrp", "ripple", "cardano",
    "ada", "polygon", "matic", "doge", "dogecoin", "shiba", "avalanche", "avax", "polkadot", "dot",
    "chainlink", "link", "uniswap", "uni", "litecoin", "ltc", "binance", "bnb", "tether", "usdt",
    "usdc", "dai", "stablecoin", "defi", "nft", "web3", "blockchain", "token", "coin",
];

/// Event group as returned by `/events`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GammaEvent {
    pub id: String,
    #[serde(default, deserialize_with = "de_null_string")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "volume24hr", default, deserialize_with = "de_opt_f64")]
    pub volume_24hr: Option<f64>,
    #[serde(default)]
    pub markets: Vec<GammaMarket>,
    /// Dashboard selection buckets, assigned locally
    #[serde(rename = "selection", skip_deserializing, default)]
    pub tags: Vec<String>,
}

/// Market nested inside an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GammaMarket {
    pub id: String,
    #[serde(default, deserialize_with = "de_null_string")]
    pub question: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub volume: Option<f64>,
    /// JSON string `"[\"Yes\", \"No\"]"` or a plain array
    #[serde(default)]
    pub outcomes: Option<Value>,
    /// JSON string `"[\"0.55\", \"0.45\"]"` or a plain array
    #[serde(rename = "outcomePrices", default)]
    pub outcome_prices: Option<Value>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Gamma reports numbers either as JSON numbers or as decimal strings
fn de_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Text fields are sometimes `null` on draft events
fn de_null_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a list field that may be a JSON-encoded string or an array.
///
/// A missing field is an empty list; anything that is not a list of strings
/// or numbers is `None`.
pub fn parse_string_list(raw: &Option<Value>) -> Option<Vec<String>> {
    let value = match raw {
        None | Some(Value::Null) => return Some(Vec::new()),
        Some(Value::String(s)) => serde_json::from_str::<Value>(s).ok()?,
        Some(v) => v.clone(),
    };

    value
        .as_array()?
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

fn is_crypto(event: &GammaEvent) -> bool {
    let title = event.title.to_lowercase();
    let desc = event.description.as_deref().unwrap_or("").to_lowercase();
    CRYPTO_KEYWORDS
        .iter()
        .any(|kw| title.contains(kw) || desc.contains(kw))
}

fn closes_within(event: &GammaEvent, now: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
    event
        .end_date
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|end| {
            let end = end.with_timezone(&Utc);
            end > now && end <= cutoff
        })
        .unwrap_or(false)
}

/// Pick trending, crypto and closing-soon events, deduplicated by id.
///
/// Earlier buckets win the position in the output; every event carries the
/// tags of all buckets it was picked for.
pub fn select_events(events: Vec<GammaEvent>, config: &GammaConfig, now: DateTime<Utc>) -> Vec<GammaEvent> {
    let mut by_volume: Vec<&GammaEvent> = events.iter().collect();
    by_volume.sort_by(|a, b| {
        let va = a.volume_24hr.unwrap_or(0.0);
        let vb = b.volume_24hr.unwrap_or(0.0);
        vb.partial_cmp(&va).unwrap_or(std::cmp::Ordering::Equal)
    });
    let trending: Vec<&GammaEvent> = by_volume.into_iter().take(config.trending_limit).collect();

    let crypto: Vec<&GammaEvent> = events
        .iter()
        .filter(|e| is_crypto(e))
        .take(config.crypto_limit)
        .collect();

    let cutoff = now + Duration::days(config.closing_soon_days);
    let closing: Vec<&GammaEvent> = events
        .iter()
        .filter(|e| closes_within(e, now, cutoff))
        .take(config.closing_soon_limit)
        .collect();

    info!(
        "Filtered: {} trending (by volume), {} crypto (by keywords), {} closing soon ({} days)",
        trending.len(),
        crypto.len(),
        closing.len(),
        config.closing_soon_days
    );

    let ids = |bucket: &[&GammaEvent]| -> HashSet<String> { bucket.iter().map(|e| e.id.clone()).collect() };
    let trending_ids = ids(&trending);
    let crypto_ids = ids(&crypto);
    let closing_ids = ids(&closing);

    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for event in trending.into_iter().chain(crypto).chain(closing) {
        if event.id.is_empty() || !seen.insert(event.id.clone()) {
            continue;
        }
        let mut event = event.clone();
        event.tags = [
            (TAG_TRENDING, &trending_ids),
            (TAG_CRYPTO, &crypto_ids),
            (TAG_CLOSING_SOON, &closing_ids),
        ]
        .into_iter()
        .filter(|(_, set)| set.contains(&event.id))
        .map(|(tag, _)| tag.to_string())
        .collect();
        selected.push(event);
    }

    info!("Final deduplicated events: {}", selected.len());
    selected
}

/// Gamma API client for market data
#[derive(Clone)]
pub struct GammaClient {
    http: Client,
    config: GammaConfig,
    retry: RetryConfig,
}

impl GammaClient {
    pub fn new(config: GammaConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            retry: RetryConfig::with_attempts(config.max_attempts),
            config: GammaConfig {
                url: config.url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    /// Get active, open events
    pub async fn get_events(&self) -> Result<Vec<GammaEvent>> {
        let url = format!("{}/events", self.config.url);
        let limit = self.config.limit.to_string();

        let events: Vec<GammaEvent> = with_retry(&self.retry, "Gamma events fetch", || async {
            debug!("GET {} (limit {})", url, limit);
            let resp = self
                .http
                .get(&url)
                .query(&[
                    ("limit", limit.as_str()),
                    ("offset", "0"),
                    ("closed", "false"),
                    ("active", "true"),
                ])
                .send()
                .await?;
            let events = check_status(resp).await?.json::<Vec<GammaEvent>>().await?;
            Ok(events)
        })
        .await?;

        info!("Received {} total events", events.len());
        Ok(events)
    }

    /// Fetch and select the events shown on the dashboard
    pub async fn get_dashboard_events(&self) -> Result<Vec<GammaEvent>> {
        let events = self.get_events().await?;
        Ok(select_events(events, &self.config, Utc::now()))
    }
}

#[async_trait]
impl MarketSource for GammaClient {
    async fn fetch_events(&self) -> Result<Vec<GammaEvent>> {
        self.get_dashboard_events().await
    }

    fn name(&self) -> &str {
        "gamma"
    }
}
