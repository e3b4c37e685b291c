//! Finnhub REST client: US quotes and all candle history.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::chart::Timeframe;
use crate::market::constant::MarketRegion;
use crate::market::object::QuoteData;
use crate::market::setting::SETTINGS;
use super::{CandleFeed, CandleSeries, FeedError, QuoteFeed};

const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

/// REST client for Finnhub
pub struct FinnhubClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FinnhubClient {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a client from global settings.
    pub fn from_settings() -> Self {
        let api_key = SETTINGS.get_string("feed.finnhub_key").unwrap_or_default();
        let timeout = SETTINGS.get_int("feed.timeout_secs").unwrap_or(10) as u64;
        Self::new(api_key, timeout)
    }

    /// Override the base URL (for pointing at a mirror).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Map a symbol to Finnhub's naming: Brazilian tickers live under their
    /// `.SA` listing.
    fn upstream_symbol(symbol: &str) -> String {
        let symbol = symbol.trim().to_uppercase();
        match MarketRegion::of(&symbol) {
            MarketRegion::Br => format!("{}.SA", symbol),
            MarketRegion::Us => symbol,
        }
    }
}

/// Quote payload: `c` is the current price, `pc` the previous close.
#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    c: Option<f64>,
    pc: Option<f64>,
}

/// Candle payload: parallel arrays, `s == "ok"` when data is present.
#[derive(Debug, Deserialize)]
struct FinnhubCandles {
    s: Option<String>,
    t: Option<Vec<i64>>,
    c: Option<Vec<f64>>,
}

#[async_trait]
impl QuoteFeed for FinnhubClient {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteData, FeedError> {
        if self.api_key.is_empty() {
            return Err(FeedError::MissingKey);
        }

        let url = format!("{}/quote", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FeedError::Status(resp.status().as_u16()));
        }

        let payload: FinnhubQuote = resp.json().await?;
        let px = payload
            .c
            .filter(|v| v.is_finite())
            .ok_or(FeedError::Malformed("missing current price"))?;
        let chg = match payload.pc.filter(|v| v.is_finite() && *v != 0.0) {
            Some(prev) => px / prev - 1.0,
            None => 0.0,
        };

        Ok(QuoteData::new(px, chg))
    }
}

#[async_trait]
impl CandleFeed for FinnhubClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<CandleSeries, FeedError> {
        if self.api_key.is_empty() {
            return Err(FeedError::MissingKey);
        }

        let query = timeframe.candle_query();
        let to = chrono::Utc::now().timestamp();
        let from = to - query.lookback_secs;

        let url = format!("{}/stock/candle", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", Self::upstream_symbol(symbol)),
                ("resolution", query.resolution.to_string()),
                ("from", from.to_string()),
                ("to", to.to_string()),
                ("token", self.api_key.clone()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FeedError::Status(resp.status().as_u16()));
        }

        let payload: FinnhubCandles = resp.json().await?;
        if payload.s.as_deref() != Some("ok") {
            return Err(FeedError::NoData);
        }

        let (t, c) = match (payload.t, payload.c) {
            (Some(t), Some(c)) if !t.is_empty() && !c.is_empty() => (t, c),
            _ => return Err(FeedError::NoData),
        };

        // Drop non-finite closes together with their timestamps.
        let mut series = CandleSeries::default();
        for (ts, close) in t.into_iter().zip(c.into_iter()) {
            if close.is_finite() {
                series.t.push(ts);
                series.c.push(close);
            }
        }

        if series.is_empty() {
            return Err(FeedError::NoData);
        }
        Ok(series)
    }
}
