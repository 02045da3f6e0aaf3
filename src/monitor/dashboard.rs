//! Dashboard HTTP API
//!
//! Serves the latest published payload and its widgets as JSON. Until a
//! payload exists the data endpoints answer 503.

use crate::aggregator::{DashboardData, DashboardMetadata, NewsFeedEntry, RiskWidget};
use crate::error::Result;
use crate::storage;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::info;

/// Latest payload shared across handlers and the refresh loop
#[derive(Default)]
pub struct DashboardState {
    data: RwLock<Option<DashboardData>>,
    updated_at: RwLock<Option<DateTime<Utc>>>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: DashboardData) -> Self {
        Self {
            data: RwLock::new(Some(data)),
            updated_at: RwLock::new(Some(Utc::now())),
        }
    }

    /// Replace the served payload
    pub async fn publish(&self, data: DashboardData) {
        *self.data.write().await = Some(data);
        *self.updated_at.write().await = Some(Utc::now());
    }

    pub async fn current(&self) -> Option<DashboardData> {
        self.data.read().await.clone()
    }

    pub async fn updated_at(&self) -> Option<DateTime<Utc>> {
        *self.updated_at.read().await
    }

    /// Seed the state from a previously written payload file, if present
    pub async fn load_from(&self, path: &Path) -> Result<bool> {
        match storage::load_json_opt::<DashboardData>(path).await? {
            Some(data) => {
                info!("Loaded dashboard payload from {}", path.display());
                self.publish(data).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    has_data: bool,
    last_updated: Option<DateTime<Utc>>,
}

async fn health_check(State(state): State<Arc<DashboardState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        has_data: state.data.read().await.is_some(),
        last_updated: state.updated_at().await,
    })
}

type ApiResult<T> = std::result::Result<Json<T>, StatusCode>;

async fn with_payload<T>(state: &DashboardState, pick: impl FnOnce(&DashboardData) -> T) -> ApiResult<T> {
    state
        .data
        .read()
        .await
        .as_ref()
        .map(|data| Json(pick(data)))
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

async fn get_dashboard(State(state): State<Arc<DashboardState>>) -> ApiResult<DashboardData> {
    with_payload(&state, |d| d.clone()).await
}

async fn get_risk(State(state): State<Arc<DashboardState>>) -> ApiResult<RiskWidget> {
    with_payload(&state, |d| d.widgets.risk_categories.clone()).await
}

async fn get_news(State(state): State<Arc<DashboardState>>) -> ApiResult<Vec<NewsFeedEntry>> {
    with_payload(&state, |d| d.widgets.news_feed.clone()).await
}

async fn get_metadata(State(state): State<Arc<DashboardState>>) -> ApiResult<DashboardMetadata> {
    with_payload(&state, |d| d.metadata.clone()).await
}

/// Create dashboard router
pub fn create_router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/risk", get(get_risk))
        .route("/api/news", get(get_news))
        .route("/api/metadata", get(get_metadata))
        .with_state(state)
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<DashboardState>) -> Result<()> {
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

/// Start dashboard server
pub async fn start_dashboard(state: Arc<DashboardState>, port: u16) -> Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Dashboard server starting on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    serve(listener, state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_dashboard;
    use crate::types::{AnalysisStats, NewsAnalysis};

    fn sample_payload() -> DashboardData {
        let analysis = NewsAnalysis {
            news_market_mapping: vec![],
            stats: AnalysisStats {
                total_analyzed: 7,
                ..Default::default()
            },
            analyzed_at: Utc::now().to_rfc3339(),
        };
        build_dashboard(&[], &analysis)
    }

    #[tokio::test]
    async fn test_empty_state_is_unavailable() {
        let state = Arc::new(DashboardState::new());

        assert_eq!(
            get_dashboard(State(state.clone())).await.err(),
            Some(StatusCode::SERVICE_UNAVAILABLE)
        );
        assert!(get_metadata(State(state.clone())).await.is_err());

        let Json(health) = health_check(State(state)).await;
        assert!(!health.has_data);
        assert!(health.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_publish_serves_payload() {
        let state = Arc::new(DashboardState::new());
        state.publish(sample_payload()).await;

        let Json(metadata) = get_metadata(State(state.clone())).await.unwrap();
        assert_eq!(metadata.news_analyzed, 7);

        let Json(risk) = get_risk(State(state.clone())).await.unwrap();
        assert!(risk.medium_risk.is_empty());

        let Json(news) = get_news(State(state.clone())).await.unwrap();
        assert!(news.is_empty());

        assert!(state.updated_at().await.is_some());
    }

    #[tokio::test]
    async fn test_load_from_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard_data.json");
        let state = DashboardState::new();

        assert!(!state.load_from(&path).await.unwrap());

        storage::save_json(&path, &sample_payload()).await.unwrap();
        assert!(state.load_from(&path).await.unwrap());
        assert_eq!(state.current().await.unwrap().metadata.news_analyzed, 7);
    }

    #[tokio::test]
    async fn test_router_over_http() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(DashboardState::with_data(sample_payload()));
        tokio::spawn(serve(listener, state));

        let body: serde_json::Value = reqwest::get(format!("http://{}/api/dashboard", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["metadata"]["news_analyzed"], 7);

        let health: serde_json::Value = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["has_data"], true);
    }
}
