//! `GET /api/quote?symbol=SYM` — current price and fractional day change.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::market::object::QuoteResult;
use super::{no_store_headers, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct QuoteParams {
    pub symbol: Option<String>,
}

/// Wire shape: `chg` is a fraction (0.012 == +1.2%). `px` is null and `error`
/// set when nothing could be fetched; the status stays 200 so the frontend
/// never sees a broken screen.
#[derive(Debug, Serialize, PartialEq)]
pub struct QuoteResponse {
    pub px: Option<f64>,
    pub chg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn get_quote(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> impl IntoResponse {
    let (status, body) = quote_response(&state, params.symbol.as_deref().unwrap_or("")).await;
    (status, no_store_headers(), Json(body))
}

/// Handler core, split out so it is testable without an HTTP stack.
pub(crate) async fn quote_response(state: &AppState, symbol: &str) -> (StatusCode, QuoteResponse) {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            QuoteResponse {
                px: None,
                chg: 0.0,
                error: Some("symbol required".to_string()),
            },
        );
    }

    // The last known quote (if the poller has one) backs the stale fallback.
    let last = state.engine.quote(&symbol);
    let body = match state.feeds.quote(&symbol, last).await {
        QuoteResult::Fresh(quote) => QuoteResponse {
            px: Some(quote.px),
            chg: quote.chg,
            error: None,
        },
        QuoteResult::Stale(quote) => QuoteResponse {
            px: Some(quote.px),
            chg: quote.chg,
            error: Some("stale: upstream unavailable".to_string()),
        },
        QuoteResult::Unavailable => QuoteResponse {
            px: None,
            chg: 0.0,
            error: Some("upstream unavailable".to_string()),
        },
    };

    (StatusCode::OK, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{CandleFeed, CandleSeries, FeedError, FeedRouter, QuoteFeed};
    use crate::market::engine::MarketEngine;
    use crate::market::object::QuoteData;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StubQuotes(Option<QuoteData>);

    #[async_trait]
    impl QuoteFeed for StubQuotes {
        async fn fetch_quote(&self, _symbol: &str) -> Result<QuoteData, FeedError> {
            self.0.ok_or(FeedError::Status(502))
        }
    }

    struct NoCandles;

    #[async_trait]
    impl CandleFeed for NoCandles {
        async fn fetch_candles(
            &self,
            _symbol: &str,
            _timeframe: crate::chart::Timeframe,
        ) -> Result<CandleSeries, FeedError> {
            Err(FeedError::NoData)
        }
    }

    fn state(us: Option<QuoteData>, br: Option<QuoteData>) -> AppState {
        AppState {
            engine: Arc::new(MarketEngine::with_max_points(1200)),
            feeds: Arc::new(FeedRouter::new(
                Arc::new(StubQuotes(us)),
                Arc::new(StubQuotes(br)),
                Arc::new(NoCandles),
                1200,
            )),
        }
    }

    #[tokio::test]
    async fn test_missing_symbol_is_bad_request() {
        let state = state(Some(QuoteData::new(1.0, 0.0)), None);
        let (status, body) = quote_response(&state, "  ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.as_deref(), Some("symbol required"));
        assert_eq!(body.px, None);
    }

    #[tokio::test]
    async fn test_us_symbol_routes_to_us_provider() {
        let state = state(Some(QuoteData::new(456.1, 0.003)), Some(QuoteData::new(62.35, 0.006)));
        let (status, body) = quote_response(&state, "TSLA").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.px, Some(456.1));
        assert_eq!(body.chg, 0.003);
        assert_eq!(body.error, None);
    }

    #[tokio::test]
    async fn test_br_symbol_routes_to_br_provider() {
        let state = state(Some(QuoteData::new(456.1, 0.003)), Some(QuoteData::new(62.35, 0.006)));
        let (_, body) = quote_response(&state, "vale3").await;
        assert_eq!(body.px, Some(62.35));
        assert_eq!(body.chg, 0.006);
    }

    #[tokio::test]
    async fn test_upstream_failure_still_resolves() {
        let state = state(None, None);
        let (status, body) = quote_response(&state, "TSLA").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.px, None);
        assert_eq!(body.chg, 0.0);
        assert!(body.error.is_some());
    }

    #[tokio::test]
    async fn test_failure_with_known_quote_serves_stale() {
        let state = state(None, None);
        state
            .engine
            .apply_quote("TSLA", crate::market::object::QuoteResult::Fresh(QuoteData::new(450.0, 0.01)));

        let (status, body) = quote_response(&state, "TSLA").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.px, Some(450.0));
        assert!(body.error.as_deref().unwrap_or("").contains("stale"));
    }

    #[test]
    fn test_wire_shape_omits_absent_error() {
        let json = serde_json::to_string(&QuoteResponse {
            px: Some(456.1),
            chg: 0.003,
            error: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"px":456.1,"chg":0.003}"#);

        let json = serde_json::to_string(&QuoteResponse {
            px: None,
            chg: 0.0,
            error: Some("upstream unavailable".to_string()),
        })
        .unwrap();
        assert!(json.contains(r#""px":null"#));
        assert!(json.contains("upstream unavailable"));
    }
}
