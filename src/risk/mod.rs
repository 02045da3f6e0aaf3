//! Risk/reward scoring for market outcomes
//!
//! Prices on a prediction market are close to the true probability, so the
//! expected value of a position is close to zero and does not separate
//! outcomes. The score instead rewards payout ratio, discounted by how liquid
//! the market is:
//!
//! ```text
//! multiplier    = 1 / price
//! volume_weight = clamp((log10(volume) - 4) / 3, 0.1, 1.0)
//! score         = max(0, multiplier - 1) * volume_weight
//! ```


use crate::client::gamma::{parse_string_list, GammaEvent, GammaMarket};
use crate::types::{Market, Outcome, RiskCategory, RiskMetrics};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Weight applied to markets without volume or below $10k
pub const MIN_VOLUME_WEIGHT: f64 = 0.1;

const MARKET_URL_BASE: &str = "https://polymarket.com/event";

/// Compute the risk metrics of one outcome.
///
/// Inputs outside their nominal range are absorbed by the formulas: a
/// non-positive price yields a zero multiplier and a non-positive volume the
/// minimum liquidity weight.
pub fn score(probability: f64, price: f64, volume: f64) -> RiskMetrics {
    let multiplier = if price > 0.0 { 1.0 / price } else { 0.0 };

    // Stake normalized to one unit
    let expected_value = probability * multiplier - 1.0;

    let kelly_fraction = kelly(probability, multiplier);
    let volume_weight = volume_weight(volume);
    let score = (multiplier - 1.0).max(0.0) * volume_weight;

    let multiplier = round_dp(multiplier, 2);

    RiskMetrics {
        score: round_dp(score, 6),
        multiplier,
        expected_value: round_dp(expected_value, 4),
        kelly_fraction: round_dp(kelly_fraction, 4),
        volume_weight: round_dp(volume_weight, 4),
        risk_category: categorize(probability, multiplier),
    }
}

/// Kelly fraction for a binary bet paying `multiplier - 1` to one
pub fn kelly(probability: f64, multiplier: f64) -> f64 {
    let b = multiplier - 1.0;
    if b > 0.0 {
        let f = (b * probability - (1.0 - probability)) / b;
        f.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Logarithmic liquidity weight: $10k and below -> 0.1, $10M and above -> 1.0
pub fn volume_weight(volume: f64) -> f64 {
    if volume > 0.0 {
        ((volume.log10() - 4.0) / 3.0).clamp(MIN_VOLUME_WEIGHT, 1.0)
    } else {
        MIN_VOLUME_WEIGHT
    }
}

/// Bucket an outcome by probability and payout multiplier
pub fn categorize(probability: f64, multiplier: f64) -> RiskCategory {
    if (0.05..=0.10).contains(&probability) && (10.0..=20.0).contains(&multiplier) {
        RiskCategory::Medium
    } else if probability > 0.10 && probability <= 0.20 && (5.0..=10.0).contains(&multiplier) {
        RiskCategory::Low
    } else if probability < 0.05 && multiplier > 20.0 {
        RiskCategory::Extreme
    } else if probability > 0.60 && multiplier < 2.0 {
        RiskCategory::Safe
    } else {
        RiskCategory::Other
    }
}

/// Round half-to-even at `dp` decimal places; non-finite values pass through
fn round_dp(value: f64, dp: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(dp))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Flatten Gamma events into scored markets
pub fn enrich_markets(events: &[GammaEvent]) -> Vec<Market> {
    let mut markets = Vec::new();

    for event in events {
        for gm in &event.markets {
            match enrich_market(event, gm) {
                Some(market) => markets.push(market),
                None => warn!("Failed to parse outcomes/prices for market {}", gm.id),
            }
        }
    }

    info!("Enriched {} markets with risk metrics", markets.len());
    markets
}

fn enrich_market(event: &GammaEvent, gm: &GammaMarket) -> Option<Market> {
    let names = parse_string_list(&gm.outcomes)?;
    let prices = parse_string_list(&gm.outcome_prices)?;
    let volume = gm.volume.unwrap_or(0.0);

    let outcomes = names
        .into_iter()
        .zip(prices)
        .filter_map(|(name, raw_price)| match raw_price.trim().parse::<f64>() {
            Ok(price) if price.is_finite() => {
                let probability = price;
                Some(Outcome {
                    risk_metrics: score(probability, price, volume),
                    name,
                    price,
                    probability,
                    volume,
                })
            }
            _ => {
                warn!("Failed to process outcome {}: invalid price {:?}", name, raw_price);
                None
            }
        })
        .collect();

    let image = gm
        .image
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| event.image.clone())
        .unwrap_or_default();

    Some(Market {
        question: gm.question.clone(),
        url: format!("{}/{}", MARKET_URL_BASE, gm.slug.as_deref().unwrap_or("")),
        end_date: gm.end_date.clone().filter(|s| !s.is_empty()),
        volume,
        outcomes,
        event_title: event.title.clone(),
        market_id: gm.id.clone(),
        image,
        tags: event.tags.clone(),
    })
}
