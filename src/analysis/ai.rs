//! AI relevance strategy
//!
//! Asks an LLM for a JSON verdict. Any transport or parse problem is returned
//! as an error so the caller can fall back; nothing is guessed here.

use crate::client::CompletionClient;
use crate::error::{DashboardError, Result};
use crate::types::{AnalysisMethod, Confidence, ImpactDirection, RelevanceJudgment};
use serde::Deserialize;
use std::sync::Arc;

pub struct AiStrategy {
    client: Arc<dyn CompletionClient>,
}

/// Verdict exactly as the model is asked to return it
#[derive(Debug, Deserialize)]
struct AiVerdict {
    relevance_score: f64,
    affects_outcomes: Vec<String>,
    impact_direction: ImpactDirection,
    confidence: Confidence,
    reasoning: String,
}

impl AiStrategy {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub fn name(&self) -> String {
        self.client.name()
    }

    pub async fn analyze(
        &self,
        news_title: &str,
        market_question: &str,
        outcome_names: &[String],
    ) -> Result<RelevanceJudgment> {
        let prompt = build_prompt(news_title, market_question, outcome_names);
        let response = self.client.complete(&prompt).await?;
        parse_response(&response, outcome_names)
    }
}

pub fn build_prompt(news_title: &str, market_question: &str, outcome_names: &[String]) -> String {
    format!(
        r#"Analyze if this news is relevant to the prediction market.

NEWS: "{}"

MARKET: "{}"
OUTCOMES: {}

Task:
1. Determine relevance score (0-10, where 10 = highly relevant)
2. If relevance >= 7, identify which outcome(s) it affects, using only the outcome names listed above
3. Determine impact direction: positive, negative, or neutral
4. Provide confidence level: low, medium, high

Respond in JSON format:
{{
  "relevance_score": <0-10>,
  "affects_outcomes": ["outcome1", "outcome2"],
  "impact_direction": "positive|negative|neutral",
  "confidence": "low|medium|high",
  "reasoning": "brief explanation (1-2 sentences)"
}}

Only respond with JSON, no other text."#,
        news_title,
        market_question,
        outcome_names.join(", ")
    )
}

/// Parse the model reply into a judgment.
///
/// The reply may wrap the object in prose or code fences; the outermost
/// `{...}` is used. Scores are clamped to 0-10 and affected outcomes are
/// mapped onto `outcome_names`, dropping anything the market does not have.
pub fn parse_response(response: &str, outcome_names: &[String]) -> Result<RelevanceJudgment> {
    let json_str = match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if end > start => &response[start..=end],
        _ => {
            return Err(DashboardError::Parse(format!(
                "No JSON object in LLM response: {}",
                response.chars().take(80).collect::<String>()
            )))
        }
    };

    let verdict: AiVerdict = serde_json::from_str(json_str)
        .map_err(|e| DashboardError::Parse(format!("Failed to parse LLM response: {}", e)))?;

    if !verdict.relevance_score.is_finite() {
        return Err(DashboardError::Parse("Non-finite relevance score".into()));
    }

    let mut affects_outcomes: Vec<String> = Vec::new();
    for claimed in &verdict.affects_outcomes {
        let canonical = outcome_names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(claimed.trim()));
        if let Some(name) = canonical {
            if !affects_outcomes.contains(name) {
                affects_outcomes.push(name.clone());
            }
        }
    }

    Ok(RelevanceJudgment {
        relevance_score: verdict.relevance_score.clamp(0.0, 10.0),
        affects_outcomes,
        impact_direction: verdict.impact_direction,
        confidence: verdict.confidence,
        reasoning: verdict.reasoning,
        analysis_method: AnalysisMethod::Ai,
    })
}
