//! Dashboard serving and periodic refresh

pub mod dashboard;

pub use dashboard::{create_router, serve, start_dashboard, DashboardState};

use crate::pipeline::Pipeline;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Re-run the pipeline every `every` and publish each successful payload.
/// A failed run keeps the previously served payload.
pub async fn run_refresh_loop(pipeline: Pipeline, state: Arc<DashboardState>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    info!("Dashboard refresh every {}s", every.as_secs());

    loop {
        interval.tick().await;
        match pipeline.run().await {
            Ok(data) => {
                state.publish(data).await;
                info!("Dashboard payload refreshed");
            }
            Err(e) => {
                error!("Dashboard refresh failed, keeping previous payload: {}", e);
            }
        }
    }
}
