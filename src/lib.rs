//! SmartTrader - a market-data dashboard engine written in Rust
//!
//! This crate provides the moving parts of a small trading dashboard:
//!
//! - Chart viewport engine (zoom, pan, timeframe mapping)
//! - Quote and candle clients for Finnhub and brapi.dev with degrade-to-
//!   synthetic fallbacks
//! - Paper-trading ledger and price alerts
//! - HTTP proxy endpoints (`/api/quote`, `/api/series`)
//! - Line chart widget (with the `gui` feature)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use smart_trader::feed::FeedRouter;
//! use smart_trader::market::{MarketEngine, QuotePoller, DEFAULT_SYMBOLS};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = Arc::new(MarketEngine::new());
//!     for sym in DEFAULT_SYMBOLS {
//!         engine.add_symbol(sym);
//!     }
//!
//!     let feeds = Arc::new(FeedRouter::from_settings());
//!     let poller = Arc::new(QuotePoller::new(engine, feeds));
//!     tokio::spawn(poller.run());
//! }
//! ```

pub mod api;
pub mod chart;
pub mod feed;
pub mod market;

// Re-export commonly used types
pub use chart::{Timeframe, Viewport, ViewportState};
pub use feed::{BrapiClient, CandleSeries, FeedError, FeedRouter, FinnhubClient};
pub use market::{
    AlertCondition, AlertData, MarketEngine, MarketRegion, PositionData, PriceSeries, QuoteData,
    QuotePoller, QuoteResult, TradeSide, DEFAULT_SYMBOLS,
};

#[cfg(feature = "gui")]
pub use chart::ChartWidget;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
