//! Upstream market-data providers and the region router.
//!
//! Quotes come from Finnhub (US) or brapi.dev (Brazil), selected once per
//! symbol via [`MarketRegion`]. Candle history always comes from Finnhub,
//! with Brazilian symbols mapped onto their `.SA` listing. Every failure
//! degrades to a usable substitute: quotes fall back to the last known value,
//! series fall back to a synthetic random walk, so the chart never goes
//! blank.

pub mod brapi;
pub mod finnhub;

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::chart::Timeframe;
use crate::market::constant::MarketRegion;
use crate::market::object::{QuoteData, QuoteResult};
use crate::market::setting::SETTINGS;

pub use brapi::BrapiClient;
pub use finnhub::FinnhubClient;

/// Errors from the provider layer.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("upstream payload malformed: {0}")]
    Malformed(&'static str),

    #[error("upstream returned no data")]
    NoData,

    #[error("no API key configured")]
    MissingKey,
}

/// Candle history as returned by the upstream: parallel timestamp/close
/// arrays. Timestamp units are whatever the upstream uses (Finnhub: epoch
/// seconds); consumers normalize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    pub t: Vec<i64>,
    pub c: Vec<f64>,
}

impl CandleSeries {
    pub fn is_empty(&self) -> bool {
        self.t.is_empty() || self.c.is_empty()
    }

    /// Keep at most the newest `n` candles.
    pub fn clamp_len(&mut self, n: usize) {
        if self.t.len() > n {
            self.t.drain(..self.t.len() - n);
        }
        if self.c.len() > n {
            self.c.drain(..self.c.len() - n);
        }
    }
}

/// A provider that can serve current quotes.
#[async_trait]
pub trait QuoteFeed: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteData, FeedError>;
}

/// A provider that can serve candle history.
#[async_trait]
pub trait CandleFeed: Send + Sync {
    async fn fetch_candles(&self, symbol: &str, timeframe: Timeframe)
        -> Result<CandleSeries, FeedError>;
}

/// Region-dispatching feed front end.
///
/// Owns one quote provider per market region plus the candle provider, and
/// applies the degrade-don't-fail policy on top of them.
pub struct FeedRouter {
    us_quotes: Arc<dyn QuoteFeed>,
    br_quotes: Arc<dyn QuoteFeed>,
    candles: Arc<dyn CandleFeed>,
    max_points: usize,
}

impl FeedRouter {
    pub fn new(
        us_quotes: Arc<dyn QuoteFeed>,
        br_quotes: Arc<dyn QuoteFeed>,
        candles: Arc<dyn CandleFeed>,
        max_points: usize,
    ) -> Self {
        Self {
            us_quotes,
            br_quotes,
            candles,
            max_points,
        }
    }

    /// Build the production router from global settings.
    pub fn from_settings() -> Self {
        let finnhub = Arc::new(FinnhubClient::from_settings());
        let brapi = Arc::new(BrapiClient::from_settings());
        let max_points = SETTINGS.get_int("series.max_points").unwrap_or(1200) as usize;
        Self::new(finnhub.clone(), brapi, finnhub, max_points)
    }

    /// Fetch a quote, degrading to the last known value on failure.
    pub async fn quote(&self, symbol: &str, last: Option<QuoteData>) -> QuoteResult {
        let feed = match MarketRegion::of(symbol) {
            MarketRegion::Us => &self.us_quotes,
            MarketRegion::Br => &self.br_quotes,
        };

        match feed.fetch_quote(symbol).await {
            Ok(quote) => QuoteResult::Fresh(quote),
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "quote fetch failed");
                match last {
                    Some(quote) => QuoteResult::Stale(quote),
                    None => QuoteResult::Unavailable,
                }
            }
        }
    }

    /// Fetch candle history. Never fails: an empty or failed upstream yields
    /// a synthetic random walk so the chart always has something to render.
    pub async fn series(&self, symbol: &str, timeframe: Timeframe) -> CandleSeries {
        let mut series = match self.candles.fetch_candles(symbol, timeframe).await {
            Ok(series) if !series.is_empty() => series,
            Err(FeedError::MissingKey) => {
                warn!(symbol = %symbol, "no API key, using synthetic walk");
                synthetic_walk(300, 15 * 60, 100.0, 80.0)
            }
            Ok(_) => {
                warn!(symbol = %symbol, "empty series from upstream, using synthetic walk");
                synthetic_walk(200, 30 * 60, 50.0, 90.0)
            }
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "series fetch failed, using synthetic walk");
                synthetic_walk(200, 30 * 60, 50.0, 90.0)
            }
        };

        series.clamp_len(self.max_points);
        series
    }
}

/// Generate a smooth random-walk candle series ending at the current time.
///
/// Timestamps are epoch seconds spaced `tick_secs` apart; the walk starts at
/// 100 plus up to `start_spread` and each step moves by at most
/// `±0.5 / step_divisor` relative.
fn synthetic_walk(n: usize, tick_secs: i64, start_spread: f64, step_divisor: f64) -> CandleSeries {
    let mut rng = rand::rng();
    let now = chrono::Utc::now().timestamp();

    let mut c = Vec::with_capacity(n);
    c.push(100.0 + rng.random_range(0.0..start_spread));
    for i in 1..n {
        let step = (rng.random_range(0.0..1.0) - 0.5) / step_divisor;
        let next = c[i - 1] * (1.0 + step);
        c.push(next);
    }

    let t = (0..n)
        .map(|i| now - (n as i64 - 1 - i as i64) * tick_secs)
        .collect();

    CandleSeries { t, c }
}
