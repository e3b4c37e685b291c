//! HTTP proxy endpoints for the dashboard frontend.
//!
//! Two GET routes forward to the upstream providers and never surface their
//! failures as error statuses: `/api/quote` degrades to the last known or an
//! empty quote, `/api/series` to a synthetic series. The only client error is
//! a missing `symbol` parameter.

pub mod quote;
pub mod series;

use axum::{routing::get, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::feed::FeedRouter;
use crate::market::engine::MarketEngine;

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MarketEngine>,
    pub feeds: Arc<FeedRouter>,
}

/// Error body for client errors
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

/// Cache-suppressing headers attached to every proxy response.
pub fn no_store_headers() -> [(&'static str, &'static str); 2] {
    [
        ("cache-control", "no-store, max-age=0, must-revalidate"),
        ("x-robots-tag", "noindex"),
    ]
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/quote", get(quote::get_quote))
        .route("/api/series", get(series::get_series))
        .with_state(state)
}
