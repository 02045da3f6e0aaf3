//! Closing-soon report
//!
//! Lists likely outcomes of markets that resolve within the next month. Not
//! part of the dashboard payload.

use crate::types::Market;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

const QUESTION_PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ClosingCriteria {
    pub max_hours: f64,
    /// Inclusive probability band; `None` accepts any probability
    pub probability_range: Option<(f64, f64)>,
    pub min_multiplier: f64,
    pub limit: usize,
}

impl ClosingCriteria {
    pub fn strict() -> Self {
        Self {
            max_hours: 720.0,
            probability_range: Some((0.60, 0.90)),
            min_multiplier: 1.1,
            limit: 10,
        }
    }

    /// Same window without the probability band
    pub fn relaxed() -> Self {
        Self {
            probability_range: None,
            ..Self::strict()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosingCandidate {
    pub question: String,
    pub outcome: String,
    pub probability: f64,
    pub multiplier: f64,
    pub hours_to_close: f64,
}

fn parse_end_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Outcomes of markets closing in (0, `max_hours`] that meet `criteria`,
/// soonest first
pub fn closing_soon_candidates(
    markets: &[Market],
    now: DateTime<Utc>,
    criteria: &ClosingCriteria,
) -> Vec<ClosingCandidate> {
    let mut candidates = Vec::new();

    for market in markets {
        let Some(end) = market.end_date.as_deref().and_then(parse_end_date) else {
            continue;
        };
        let hours = (end - now).num_seconds() as f64 / 3600.0;
        if hours <= 0.0 || hours > criteria.max_hours {
            continue;
        }

        for outcome in &market.outcomes {
            let multiplier = outcome.risk_metrics.multiplier;
            if multiplier < criteria.min_multiplier {
                continue;
            }
            if let Some((lo, hi)) = criteria.probability_range {
                if outcome.probability < lo || outcome.probability > hi {
                    continue;
                }
            }
            candidates.push(ClosingCandidate {
                question: market.question.chars().take(QUESTION_PREVIEW_CHARS).collect(),
                outcome: outcome.name.clone(),
                probability: outcome.probability,
                multiplier: round2(multiplier),
                hours_to_close: round1(hours),
            });
        }
    }

    candidates.sort_by(|a, b| {
        a.hours_to_close
            .partial_cmp(&b.hours_to_close)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(criteria.limit);
    candidates
}

/// Strict candidates, or relaxed ones when nothing passes the strict band.
/// The flag reports whether the relaxed criteria were used.
pub fn closing_soon_report(markets: &[Market], now: DateTime<Utc>) -> (Vec<ClosingCandidate>, bool) {
    let strict = closing_soon_candidates(markets, now, &ClosingCriteria::strict());
    if !strict.is_empty() {
        return (strict, false);
    }
    (closing_soon_candidates(markets, now, &ClosingCriteria::relaxed()), true)
}
