//! End-to-end pipeline tests with in-memory sources

#[cfg(test)]
mod tests {
    use crate::aggregator::DashboardData;
    use crate::client::gamma::{GammaEvent, GammaMarket};
    use crate::client::llm::MockCompletionClient;
    use crate::client::MarketSource;
    use crate::config::Config;
    use crate::error::{DashboardError, Result};
    use crate::news::NewsSource;
    use crate::pipeline::Pipeline;
    use crate::storage;
    use crate::types::NewsItem;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;

    struct FixedMarkets(Vec<GammaEvent>);

    #[async_trait]
    impl MarketSource for FixedMarkets {
        async fn fetch_events(&self) -> Result<Vec<GammaEvent>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingMarkets;

    #[async_trait]
    impl MarketSource for FailingMarkets {
        async fn fetch_events(&self) -> Result<Vec<GammaEvent>> {
            Err(DashboardError::Status {
                status: 502,
                message: "bad gateway".into(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct FixedNews(Vec<NewsItem>);

    #[async_trait]
    impl NewsSource for FixedNews {
        async fn fetch_news(&self, _hours: i64) -> Result<Vec<NewsItem>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingNews;

    #[async_trait]
    impl NewsSource for FailingNews {
        async fn fetch_news(&self, _hours: i64) -> Result<Vec<NewsItem>> {
            Err(DashboardError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "news.json",
            )))
        }

        fn name(&self) -> &str {
            "file"
        }
    }

    fn test_config(root: &Path) -> Config {
        let mut config: Config = toml::from_str("").unwrap();
        config.storage.data_dir = root.join("data").to_string_lossy().into_owned();
        config.storage.output_path = root.join("frontend/data/dashboard_data.json").to_string_lossy().into_owned();
        config
    }

    fn events() -> Vec<GammaEvent> {
        vec![GammaEvent {
            id: "evt-1".into(),
            title: "Bitcoin price".into(),
            image: Some("https://img/evt.png".into()),
            tags: vec!["trending".into(), "crypto".into()],
            markets: vec![
                GammaMarket {
                    id: "m-btc".into(),
                    question: "Will Bitcoin reach $150k?".into(),
                    slug: Some("btc-150k".into()),
                    end_date: Some("2026-12-31T00:00:00Z".into()),
                    volume: Some(1_500_000.0),
                    outcomes: Some(json!("[\"Yes\", \"No\"]")),
                    outcome_prices: Some(json!("[\"0.07\", \"0.93\"]")),
                    image: None,
                },
                GammaMarket {
                    id: "m-eth".into(),
                    question: "Will Ethereum flip Bitcoin?".into(),
                    slug: Some("eth-flip".into()),
                    volume: Some(2_000_000.0),
                    outcomes: Some(json!(["Yes", "No"])),
                    outcome_prices: Some(json!(["0.15", "0.85"])),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }]
    }

    fn news() -> Vec<NewsItem> {
        vec![NewsItem {
            title: "Yes vote: Ethereum flip Bitcoin debate heats up".into(),
            link: "https://news.example/eth".into(),
            published_at: Some(Utc::now().to_rfc3339()),
            source: "fixed".into(),
            summary: String::new(),
        }]
    }

    #[tokio::test]
    async fn test_keyword_pipeline_writes_payload_and_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let output = config.storage.output_path();
        let data_dir = config.storage.data_dir();

        let pipeline = Pipeline::new(
            config,
            Box::new(FixedMarkets(events())),
            Box::new(FixedNews(news())),
            None,
        );
        let data = pipeline.run().await.unwrap();

        assert_eq!(data.metadata.total_markets, 2);
        assert_eq!(data.metadata.trending_count, 2);
        assert_eq!(data.metadata.crypto_count, 2);
        assert_eq!(data.metadata.news_analyzed, 2);
        assert_eq!(data.widgets.risk_categories.medium_risk.len(), 1);
        assert_eq!(data.widgets.risk_categories.low_risk.len(), 1);
        assert_eq!(
            data.widgets.risk_categories.medium_risk[0].market_url,
            "https://polymarket.com/event/btc-150k"
        );

        // both markets match "Yes"; the ETH question shares more words
        assert_eq!(data.widgets.news_feed.len(), 2);
        assert_eq!(data.widgets.news_feed[0].market_title, "Will Ethereum flip Bitcoin?");
        assert_eq!(data.widgets.news_feed[0].relevance_score, 6.0);
        assert_eq!(data.widgets.news_feed[1].relevance_score, 5.5);

        let written: DashboardData = storage::load_json(&output).await.unwrap();
        assert_eq!(written.metadata, data.metadata);
        assert_eq!(written.widgets.news_feed.len(), 2);
        for file in [
            "polymarket_snapshot.json",
            "markets_with_metrics.json",
            "news_raw.json",
            "news_analyzed.json",
            "news_analysis_cache.json",
        ] {
            assert!(data_dir.join(file).exists(), "missing {}", file);
        }
    }

    #[tokio::test]
    async fn test_second_run_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();

        let first = Pipeline::new(
            test_config(dir.path()),
            Box::new(FixedMarkets(events())),
            Box::new(FixedNews(news())),
            None,
        );
        first.run().await.unwrap();

        let mut mock = MockCompletionClient::new();
        mock.expect_complete().times(0);
        let second = Pipeline::new(
            test_config(dir.path()),
            Box::new(FixedMarkets(events())),
            Box::new(FixedNews(news())),
            Some(Arc::new(mock)),
        );
        second.run().await.unwrap();

        let analysis: serde_json::Value =
            storage::load_json(&dir.path().join("data/news_analyzed.json")).await.unwrap();
        assert_eq!(analysis["stats"]["cached"], 2);
        assert_eq!(analysis["stats"]["ai"], 0);
    }

    #[tokio::test]
    async fn test_empty_market_set_aborts_without_payload() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let output = config.storage.output_path();

        let pipeline = Pipeline::new(config, Box::new(FixedMarkets(vec![])), Box::new(FixedNews(news())), None);

        assert!(matches!(pipeline.run().await, Err(DashboardError::NoMarkets)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_failed_market_fetch_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let output = config.storage.output_path();

        let pipeline = Pipeline::new(config, Box::new(FailingMarkets), Box::new(FixedNews(vec![])), None);

        assert!(matches!(pipeline.run().await, Err(DashboardError::Status { status: 502, .. })));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_failed_news_source_aborts_without_payload() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let output = config.storage.output_path();
        let data_dir = config.storage.data_dir();

        let pipeline = Pipeline::new(config, Box::new(FixedMarkets(events())), Box::new(FailingNews), None);

        assert!(matches!(pipeline.run().await, Err(DashboardError::Io(_))));
        assert!(!output.exists());
        assert!(!data_dir.join("news_analyzed.json").exists());
    }
}
