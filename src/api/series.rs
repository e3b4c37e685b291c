//! `GET /api/series?symbol=SYM&tf=TOKEN` — candle history for a symbol.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::chart::Timeframe;
use super::{no_store_headers, AppState, ErrorBody};

#[derive(Debug, Default, Deserialize)]
pub struct SeriesParams {
    pub symbol: Option<String>,
    pub tf: Option<String>,
}

/// Wire shape: parallel timestamp/close arrays in the upstream's time units
/// (epoch seconds from Finnhub); consumers normalize.
#[derive(Debug, Serialize, PartialEq)]
pub struct SeriesResponse {
    pub t: Vec<i64>,
    pub c: Vec<f64>,
}

pub async fn get_series(
    State(state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Response {
    let symbol = params.symbol.as_deref().unwrap_or("").trim().to_uppercase();
    if symbol.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            no_store_headers(),
            Json(ErrorBody {
                error: "symbol required".to_string(),
            }),
        )
            .into_response();
    }

    let timeframe = Timeframe::parse(params.tf.as_deref().unwrap_or(""));
    let body = series_response(&state, &symbol, timeframe).await;
    (StatusCode::OK, no_store_headers(), Json(body)).into_response()
}

/// Handler core, split out so it is testable without an HTTP stack. Always
/// yields a renderable series; upstream failures become synthetic data.
pub(crate) async fn series_response(
    state: &AppState,
    symbol: &str,
    timeframe: Timeframe,
) -> SeriesResponse {
    let series = state.feeds.series(symbol, timeframe).await;
    SeriesResponse {
        t: series.t,
        c: series.c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{CandleFeed, CandleSeries, FeedError, FeedRouter, QuoteFeed};
    use crate::market::engine::MarketEngine;
    use crate::market::object::QuoteData;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoQuotes;

    #[async_trait]
    impl QuoteFeed for NoQuotes {
        async fn fetch_quote(&self, _symbol: &str) -> Result<QuoteData, FeedError> {
            Err(FeedError::Status(502))
        }
    }

    struct StubCandles(Option<CandleSeries>);

    #[async_trait]
    impl CandleFeed for StubCandles {
        async fn fetch_candles(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
        ) -> Result<CandleSeries, FeedError> {
            self.0.clone().ok_or(FeedError::Status(500))
        }
    }

    fn state(candles: Option<CandleSeries>) -> AppState {
        AppState {
            engine: Arc::new(MarketEngine::with_max_points(1200)),
            feeds: Arc::new(FeedRouter::new(
                Arc::new(NoQuotes),
                Arc::new(NoQuotes),
                Arc::new(StubCandles(candles)),
                1200,
            )),
        }
    }

    #[tokio::test]
    async fn test_upstream_data_passes_through() {
        let upstream = CandleSeries {
            t: vec![1_700_000_000, 1_700_000_300],
            c: vec![456.1, 457.2],
        };
        let state = state(Some(upstream));
        let body = series_response(&state, "TSLA", Timeframe::D1).await;
        assert_eq!(body.t, vec![1_700_000_000, 1_700_000_300]);
        assert_eq!(body.c, vec![456.1, 457.2]);
    }

    #[tokio::test]
    async fn test_empty_upstream_yields_nonempty_series() {
        let state = state(Some(CandleSeries::default()));
        let body = series_response(&state, "TSLA", Timeframe::D1).await;
        assert!(!body.t.is_empty());
        assert_eq!(body.t.len(), body.c.len());
    }

    #[tokio::test]
    async fn test_failed_upstream_yields_nonempty_series() {
        let state = state(None);
        let body = series_response(&state, "GOLD", Timeframe::W1).await;
        assert!(!body.t.is_empty());
        assert_eq!(body.t.len(), body.c.len());
    }

    #[test]
    fn test_unknown_token_falls_back_to_one_day() {
        assert_eq!(Timeframe::parse("whatever"), Timeframe::D1);
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_string(&SeriesResponse {
            t: vec![1, 2],
            c: vec![1.5, 2.5],
        })
        .unwrap();
        assert_eq!(json, r#"{"t":[1,2],"c":[1.5,2.5]}"#);
    }
}
