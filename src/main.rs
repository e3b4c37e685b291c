//! SmartTrader - Main Application Entry Point
//!
//! Headless dashboard server: starts the quote polling loop and serves the
//! `/api/quote` and `/api/series` proxy endpoints.

use std::error::Error;
use std::sync::Arc;
use tracing::info;

use smart_trader::api::{self, AppState};
use smart_trader::feed::FeedRouter;
use smart_trader::market::{init_logger, MarketEngine, QuotePoller, DEFAULT_SYMBOLS, SETTINGS};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logger();
    info!("SmartTrader v{} starting", smart_trader::VERSION);

    // Engine with the default watch set; the first symbol becomes active.
    let engine = Arc::new(MarketEngine::new());
    for sym in DEFAULT_SYMBOLS {
        engine.add_symbol(sym);
    }

    let feeds = Arc::new(FeedRouter::from_settings());
    if SETTINGS
        .get_string("feed.finnhub_key")
        .unwrap_or_default()
        .is_empty()
    {
        info!("no Finnhub key configured; series requests will use synthetic data");
    }

    // Background refresh loop.
    let poller = Arc::new(QuotePoller::new(engine.clone(), feeds.clone()));
    tokio::spawn(poller.run());

    // HTTP proxy endpoints.
    let bind = SETTINGS
        .get_string("server.bind")
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());
    let app = api::router(AppState { engine, feeds });

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}
