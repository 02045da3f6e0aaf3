//! Polymarket Risk & News Dashboard
//!
//! Builds the dashboard payload from live Polymarket data and crypto news.

use chrono::Utc;
use clap::{Parser, Subcommand};
use polymarket_dashboard::{
    aggregator::closing_soon_report,
    client::GammaClient,
    config::{expand_path, Config, LoggingConfig},
    monitor::{run_refresh_loop, start_dashboard, DashboardState},
    pipeline::{Pipeline, RunOptions},
    risk,
    storage::{self, MarketSnapshot},
    types::{Market, Outcome},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "polymarket-dashboard")]
#[command(about = "Risk/reward and news dashboard for Polymarket prediction markets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the dashboard payload
    Run {
        /// Use keyword matching only, even if an LLM is configured
        #[arg(long)]
        keyword_only: bool,
        /// Read news from a JSON file instead of the RSS feeds
        #[arg(long)]
        news_file: Option<PathBuf>,
    },
    /// Fetch markets and show the best-scoring outcomes
    Markets {
        /// Number of outcomes to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Score a single outcome
    Score {
        /// Outcome price (0-1)
        #[arg(long)]
        price: f64,
        /// Win probability; defaults to the price
        #[arg(long)]
        probability: Option<f64>,
        /// Market volume in USD
        #[arg(long, default_value = "0")]
        volume: f64,
    },
    /// List likely outcomes of markets closing within 30 days
    Closing {
        /// Scored markets file; defaults to the last pipeline snapshot
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Serve the dashboard payload over HTTP
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
        /// Re-run the pipeline every N seconds
        #[arg(long)]
        refresh_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;
    let _log_guard = init_logging(&config.logging);

    match cli.command {
        Commands::Run {
            keyword_only,
            news_file,
        } => run_pipeline(config, keyword_only, news_file).await,
        Commands::Markets { limit } => show_markets(config, limit).await,
        Commands::Score {
            price,
            probability,
            volume,
        } => show_score(price, probability.unwrap_or(price), volume),
        Commands::Closing { input } => show_closing(config, input).await,
        Commands::Serve { port, refresh_secs } => serve(config, port, refresh_secs).await,
    }
}

/// Console logging plus a daily `pipeline.log` when the log directory is writable
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut guard = None;
    let file_layer = match &config.dir {
        Some(dir) => {
            let dir = expand_path(dir);
            match std::fs::create_dir_all(&dir) {
                Ok(()) => {
                    let appender = tracing_appender::rolling::daily(&dir, "pipeline.log");
                    let (writer, g) = tracing_appender::non_blocking(appender);
                    guard = Some(g);
                    Some(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
                }
                Err(e) => {
                    eprintln!("Log directory {} not writable, file logging disabled: {}", dir.display(), e);
                    None
                }
            }
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

async fn run_pipeline(config: Config, keyword_only: bool, news_file: Option<PathBuf>) -> anyhow::Result<()> {
    let options = RunOptions {
        keyword_only,
        news_file,
    };
    let pipeline = Pipeline::from_config(config, &options)?;
    let data = pipeline.run().await?;

    println!(
        "Dashboard ready: {} markets, {} medium / {} low risk picks, {} news items",
        data.metadata.total_markets,
        data.widgets.risk_categories.medium_risk.len(),
        data.widgets.risk_categories.low_risk.len(),
        data.widgets.news_feed.len()
    );
    Ok(())
}

async fn show_markets(config: Config, limit: usize) -> anyhow::Result<()> {
    let client = GammaClient::new(config.gamma.clone())?;
    let events = client.get_dashboard_events().await?;
    let markets = risk::enrich_markets(&events);

    let mut rows: Vec<(&Market, &Outcome)> = markets
        .iter()
        .flat_map(|m| m.outcomes.iter().map(move |o| (m, o)))
        .collect();
    rows.sort_by(|a, b| {
        b.1.risk_metrics
            .score
            .partial_cmp(&a.1.risk_metrics.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!("Top {} outcomes of {} markets:\n", limit.min(rows.len()), markets.len());
    for (i, (market, outcome)) in rows.iter().take(limit).enumerate() {
        let m = &outcome.risk_metrics;
        println!("{}. {} ({})", i + 1, market.question, outcome.name);
        println!(
            "   Prob: {:.1}%, Mult: {:.2}x, Score: {:.4}, Category: {}, Volume: ${:.0}",
            outcome.probability * 100.0,
            m.multiplier,
            m.score,
            m.risk_category,
            outcome.volume
        );
        println!("   {}", market.url);
    }
    Ok(())
}

fn show_score(price: f64, probability: f64, volume: f64) -> anyhow::Result<()> {
    let metrics = risk::score(probability, price, volume);
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}

async fn show_closing(config: Config, input: Option<PathBuf>) -> anyhow::Result<()> {
    let path = input.unwrap_or_else(|| config.storage.markets_path());
    let snapshot: MarketSnapshot<Market> = storage::load_json(&path).await?;
    let (candidates, relaxed) = closing_soon_report(&snapshot.markets, Utc::now());

    if relaxed {
        println!("No markets meet the criteria:");
        println!("   - Probability: 60-90%");
        println!("   - Multiplier: >= 1.1x");
        println!("   - Closing: within 30 days");
        println!();
        if candidates.is_empty() {
            println!("No markets close within 30 days with multiplier >= 1.1x either.");
            return Ok(());
        }
        println!("Relaxed criteria (any probability, mult >= 1.1x):");
    } else {
        println!("Closing soon candidates:");
    }
    println!();

    for (i, c) in candidates.iter().enumerate() {
        println!("{}. {}... ({})", i + 1, c.question, c.outcome);
        println!(
            "   Prob: {:.2}%, Mult: {}x, Hours: {}h",
            c.probability * 100.0,
            c.multiplier,
            c.hours_to_close
        );
        println!();
    }
    Ok(())
}

async fn serve(config: Config, port: Option<u16>, refresh_secs: Option<u64>) -> anyhow::Result<()> {
    let state = Arc::new(DashboardState::new());
    if !state.load_from(&config.storage.output_path()).await? {
        tracing::warn!("No dashboard payload yet; API returns 503 until the first run");
    }

    if let Some(secs) = refresh_secs.filter(|s| *s > 0) {
        let pipeline = Pipeline::from_config(config.clone(), &RunOptions::default())?;
        let state = state.clone();
        tokio::spawn(async move {
            run_refresh_loop(pipeline, state, Duration::from_secs(secs)).await;
        });
    }

    start_dashboard(state, port.unwrap_or(config.server.port)).await?;
    Ok(())
}
