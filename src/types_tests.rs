//! Tests for core types

#[cfg(test)]
mod tests {
    use super::super::types::*;

    fn make_judgment(method: AnalysisMethod) -> RelevanceJudgment {
        RelevanceJudgment {
            relevance_score: 7.5,
            affects_outcomes: vec!["Yes".to_string()],
            impact_direction: ImpactDirection::Positive,
            confidence: Confidence::High,
            reasoning: "ETF inflows point to higher prices".to_string(),
            analysis_method: method,
        }
    }

    #[test]
    fn test_risk_category_serialization() {
        assert_eq!(serde_json::to_string(&RiskCategory::Medium).unwrap(), "\"medium\"");
        assert_eq!(serde_json::to_string(&RiskCategory::Extreme).unwrap(), "\"extreme\"");
        assert_eq!(RiskCategory::Safe.to_string(), "safe");
    }

    #[test]
    fn test_analysis_method_serialization() {
        assert_eq!(serde_json::to_string(&AnalysisMethod::Ai).unwrap(), "\"ai\"");
        assert_eq!(
            serde_json::to_string(&AnalysisMethod::KeywordFallback).unwrap(),
            "\"keyword_fallback\""
        );
    }

    #[test]
    fn test_analysis_method_accepts_legacy_name() {
        let method: AnalysisMethod = serde_json::from_str("\"claude_ai\"").unwrap();
        assert_eq!(method, AnalysisMethod::Ai);
    }

    #[test]
    fn test_direction_and_confidence_deserialization() {
        let dir: ImpactDirection = serde_json::from_str("\"negative\"").unwrap();
        let conf: Confidence = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(dir, ImpactDirection::Negative);
        assert_eq!(conf, Confidence::Medium);
        assert!(serde_json::from_str::<ImpactDirection>("\"sideways\"").is_err());
    }

    #[test]
    fn test_news_market_match_flattens_judgment() {
        let m = NewsMarketMatch {
            news_id: 0,
            news_title: "Bitcoin ETF sees record inflows".to_string(),
            news_link: "https://example.com/btc".to_string(),
            market_id: "m-1".to_string(),
            market_question: "Will Bitcoin reach $150k?".to_string(),
            market_url: "https://polymarket.com/event/btc".to_string(),
            judgment: make_judgment(AnalysisMethod::Ai),
        };
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["relevance_score"], 7.5);
        assert_eq!(value["impact_direction"], "positive");
        assert_eq!(value["analysis_method"], "ai");
        assert!(value.get("judgment").is_none());

        let back: NewsMarketMatch = serde_json::from_value(value).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_market_outcome_names_skip_empty() {
        let metrics = RiskMetrics {
            score: 0.0,
            multiplier: 2.0,
            expected_value: 0.0,
            kelly_fraction: 0.0,
            volume_weight: 0.1,
            risk_category: RiskCategory::Other,
        };
        let market = Market {
            question: "Q?".to_string(),
            market_id: "m".to_string(),
            outcomes: vec![
                Outcome {
                    name: "Yes".to_string(),
                    price: 0.5,
                    probability: 0.5,
                    volume: 0.0,
                    risk_metrics: metrics.clone(),
                },
                Outcome {
                    name: String::new(),
                    price: 0.5,
                    probability: 0.5,
                    volume: 0.0,
                    risk_metrics: metrics,
                },
            ],
            tags: vec!["crypto".to_string()],
            ..Default::default()
        };
        assert_eq!(market.outcome_names(), vec!["Yes".to_string()]);
        assert!(market.has_tag("crypto"));
        assert!(!market.has_tag("trending"));
    }

    #[test]
    fn test_market_missing_optional_fields_default() {
        let json = r#"{"question": "Q?", "url": "u", "market_id": "m"}"#;
        let market: Market = serde_json::from_str(json).unwrap();
        assert!(market.end_date.is_none());
        assert_eq!(market.volume, 0.0);
        assert!(market.outcomes.is_empty());
        assert!(market.image.is_empty());
    }
}
