//! Polymarket Risk & News Dashboard
//!
//! Pulls live markets from the Polymarket Gamma API, scores every outcome's
//! risk/reward, matches recent crypto news to markets and publishes a single
//! JSON payload for a static front end.
//!
//! ## Architecture
//!
//! ```text
//! Gamma client → Risk scorer → News fetcher → Relevance classifier → Aggregator → JSON
//!                                                   ↑
//!                                  AI (LLM) → Keyword fallback, cache, rate limit
//! ```

pub mod aggregator;
pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod monitor;
pub mod news;
pub mod pipeline;
pub mod risk;
pub mod storage;
pub mod types;

#[cfg(test)]
mod types_tests;
#[cfg(test)]
mod error_tests;
#[cfg(test)]
mod integration_tests;
