//! Keyword relevance strategy
//!
//! Deterministic and always available. Scores a headline by outcome-name
//! mentions (+5) and words shared with the market question (+0.5 each, at
//! most +5).

use crate::types::{AnalysisMethod, Confidence, ImpactDirection, RelevanceJudgment};
use std::collections::HashSet;

/// Words ignored when comparing a question with a headline
pub const STOPWORDS: &[&str] = &["the", "a", "an", "will", "be", "is", "in", "of", "to", "for", "on", "at"];

const OUTCOME_MATCH_SCORE: f64 = 5.0;
const OVERLAP_WEIGHT: f64 = 0.5;
const MAX_OVERLAP_SCORE: f64 = 5.0;
const MAX_SCORE: f64 = 10.0;

pub fn analyze(news_title: &str, market_question: &str, outcome_names: &[String]) -> RelevanceJudgment {
    let news_lower = news_title.to_lowercase();
    let question_lower = market_question.to_lowercase();

    let matching_outcomes: Vec<String> = outcome_names
        .iter()
        .filter(|name| !name.is_empty() && news_lower.contains(&name.to_lowercase()))
        .cloned()
        .collect();

    let question_words: HashSet<&str> = question_lower
        .split_whitespace()
        .filter(|w| !STOPWORDS.contains(w))
        .collect();
    let news_words: HashSet<&str> = news_lower.split_whitespace().collect();
    let overlap = question_words.intersection(&news_words).count();

    let mut relevance_score = 0.0;
    if !matching_outcomes.is_empty() {
        relevance_score += OUTCOME_MATCH_SCORE;
    }
    relevance_score += (overlap as f64 * OVERLAP_WEIGHT).min(MAX_OVERLAP_SCORE);

    RelevanceJudgment {
        relevance_score: relevance_score.min(MAX_SCORE),
        reasoning: format!(
            "Keyword match: {} outcomes, {} keywords overlap",
            matching_outcomes.len(),
            overlap
        ),
        affects_outcomes: matching_outcomes,
        impact_direction: ImpactDirection::Neutral,
        confidence: Confidence::Low,
        analysis_method: AnalysisMethod::KeywordFallback,
    }
}
