//! Basic data structures used across the dashboard engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::constant::{AlertCondition, TradeSide};

/// Number of flat points seeded when the first live tick arrives, so the
/// chart opens with a short run instead of a single dead point.
const SEED_POINTS: usize = 10;

/// A single current quote reading: last price and fractional day change
/// (0.012 == +1.2%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteData {
    pub px: f64,
    pub chg: f64,
}

impl QuoteData {
    pub fn new(px: f64, chg: f64) -> Self {
        Self { px, chg }
    }
}

/// Outcome of a quote fetch, tagged so callers can tell real data from
/// filler. The HTTP layer flattens this back to the `{px, chg}` wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteResult {
    /// Fresh data from the upstream provider
    Fresh(QuoteData),
    /// Upstream failed; this is the last quote we had for the symbol
    Stale(QuoteData),
    /// Upstream failed and nothing is known for the symbol
    Unavailable,
}

impl QuoteResult {
    /// The quote carried by this result, if any.
    pub fn quote(&self) -> Option<QuoteData> {
        match self {
            QuoteResult::Fresh(q) | QuoteResult::Stale(q) => Some(*q),
            QuoteResult::Unavailable => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, QuoteResult::Fresh(_))
    }
}

/// Historical price sequence for one symbol.
///
/// Timestamps (epoch milliseconds, non-decreasing) and prices are positionally
/// paired and only ever mutated together; the two vectors always have equal
/// length. Oldest points are trimmed from the front once the cap is exceeded.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    times: Vec<i64>,
    prices: Vec<f64>,
    max_points: usize,
}

impl PriceSeries {
    /// Create an empty series retaining at most `max_points` entries.
    pub fn new(max_points: usize) -> Self {
        Self {
            times: Vec::new(),
            prices: Vec::new(),
            max_points: max_points.max(2),
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn times(&self) -> &[i64] {
        &self.times
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Price and timestamp at `ix`, if in range.
    pub fn point(&self, ix: usize) -> Option<(i64, f64)> {
        Some((*self.times.get(ix)?, *self.prices.get(ix)?))
    }

    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    /// Replace the whole series from a bulk history fetch.
    ///
    /// Unpaired tails are truncated so the pairing invariant holds, then the
    /// front is trimmed to the retention cap, keeping the newest points.
    pub fn replace(&mut self, mut times: Vec<i64>, mut prices: Vec<f64>) {
        let paired = times.len().min(prices.len());
        times.truncate(paired);
        prices.truncate(paired);

        if paired > self.max_points {
            let drop = paired - self.max_points;
            times.drain(..drop);
            prices.drain(..drop);
        }

        self.times = times;
        self.prices = prices;
    }

    /// Append one live tick, trimming the front past the retention cap.
    ///
    /// The very first tick seeds a short flat run so a freshly watched symbol
    /// renders as a line rather than a single point.
    pub fn push_tick(&mut self, ts_millis: i64, price: f64) {
        if !price.is_finite() {
            return;
        }

        if self.is_empty() {
            for k in 0..SEED_POINTS.saturating_sub(1) {
                self.times.push(ts_millis - (SEED_POINTS - 1 - k) as i64);
                self.prices.push(price);
            }
        }

        self.times.push(ts_millis);
        self.prices.push(price);

        if self.len() > self.max_points {
            let drop = self.len() - self.max_points;
            self.times.drain(..drop);
            self.prices.drain(..drop);
        }
    }

    pub fn clear(&mut self) {
        self.times.clear();
        self.prices.clear();
    }
}

/// Paper-trading position for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionData {
    pub qty: f64,
    pub avg_price: f64,
}

impl PositionData {
    pub fn new(qty: f64, avg_price: f64) -> Self {
        Self { qty, avg_price }
    }

    /// Unrealized profit/loss at the given mark price.
    pub fn unrealized_pl(&self, px: f64) -> f64 {
        (px - self.avg_price) * self.qty
    }
}

/// A pending price alert. Fires at most once, then is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertData {
    pub symbol: String,
    pub condition: AlertCondition,
    pub value: f64,
}

impl AlertData {
    pub fn new(symbol: impl Into<String>, condition: AlertCondition, value: f64) -> Self {
        Self {
            symbol: symbol.into(),
            condition,
            value,
        }
    }

    /// Whether the alert triggers against the given quote.
    ///
    /// Change conditions compare against the day change expressed in percent,
    /// matching the threshold unit the UI collects.
    pub fn is_hit(&self, quote: &QuoteData) -> bool {
        let chg_pct = quote.chg * 100.0;
        match self.condition {
            AlertCondition::Above => quote.px >= self.value,
            AlertCondition::Below => quote.px <= self.value,
            AlertCondition::ChangeUp => chg_pct >= self.value,
            AlertCondition::ChangeDown => chg_pct <= self.value,
        }
    }
}

/// Record of one executed paper trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeFill {
    pub fill_id: String,
    pub symbol: String,
    pub side: TradeSide,
    pub qty: f64,
    pub px: f64,
    pub datetime: DateTime<Utc>,
}

/// One entry in the news/activity feed shown next to the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub text: String,
    pub datetime: DateTime<Utc>,
}

impl NewsItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            datetime: Utc::now(),
        }
    }
}
