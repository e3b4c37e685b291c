//! Market engine holding the application state of the dashboard.
//!
//! All state the UI and polling loop touch (watchlist, per-symbol quotes and
//! series, paper positions, alerts, news feed) lives behind this engine's
//! accessor methods. Mutation is latest-write-wins; there are no cross-symbol
//! invariants.

use std::collections::HashMap;
use std::sync::RwLock;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chart::Timeframe;
use super::constant::{AlertCondition, MarketRegion, TradeSide};
use super::object::{
    AlertData, NewsItem, PositionData, PriceSeries, QuoteData, QuoteResult, TradeFill,
};
use super::setting::SETTINGS;
use super::utility::{format_money, now_millis};

/// Symbols watched out of the box.
pub const DEFAULT_SYMBOLS: [&str; 8] = [
    "TSLA", "NVDA", "AAPL", "AMZN", "MSFT", "ITUB4", "VALE3", "PETR4",
];

/// Maximum retained news entries.
const MAX_NEWS: usize = 200;

/// Per-symbol market state.
#[derive(Debug, Clone)]
pub struct MarketSlot {
    pub region: MarketRegion,
    pub quote: Option<QuoteData>,
    /// Whether the stored quote came from the upstream on the last fetch,
    /// as opposed to being carried over after a failure.
    pub is_fresh: bool,
    pub series: PriceSeries,
    pub timeframe: Timeframe,
}

impl MarketSlot {
    fn new(symbol: &str, max_points: usize) -> Self {
        Self {
            region: MarketRegion::of(symbol),
            quote: None,
            is_fresh: false,
            series: PriceSeries::new(max_points),
            timeframe: Timeframe::default(),
        }
    }
}

/// Engine data container
struct MarketData {
    active: String,
    watch_order: Vec<String>,
    slots: HashMap<String, MarketSlot>,
    positions: HashMap<String, PositionData>,
    alerts: Vec<AlertData>,
    news: Vec<NewsItem>,
    fills: Vec<TradeFill>,
}

/// Market engine for the dashboard state
pub struct MarketEngine {
    data: RwLock<MarketData>,
    max_points: usize,
}

impl MarketEngine {
    /// Create a new engine using the configured series retention cap.
    pub fn new() -> Self {
        let max_points = SETTINGS.get_int("series.max_points").unwrap_or(1200) as usize;
        Self::with_max_points(max_points)
    }

    /// Create a new engine with an explicit series retention cap.
    pub fn with_max_points(max_points: usize) -> Self {
        Self {
            data: RwLock::new(MarketData {
                active: String::new(),
                watch_order: Vec::new(),
                slots: HashMap::new(),
                positions: HashMap::new(),
                alerts: Vec::new(),
                news: Vec::new(),
                fills: Vec::new(),
            }),
            max_points,
        }
    }

    /// Add a symbol to the watch set. Empty input is a no-op. Returns the
    /// normalized symbol when one was added or already present.
    pub fn add_symbol(&self, symbol: &str) -> Option<String> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return None;
        }

        if let Ok(mut data) = self.data.write() {
            if !data.slots.contains_key(&symbol) {
                data.slots
                    .insert(symbol.clone(), MarketSlot::new(&symbol, self.max_points));
                data.watch_order.push(symbol.clone());
                debug!(symbol = %symbol, "symbol added to watch set");
            }
            if data.active.is_empty() {
                data.active = symbol.clone();
            }
        }
        Some(symbol)
    }

    /// Set the active symbol, adding it to the watch set if needed.
    /// Empty input is a no-op.
    pub fn set_active(&self, symbol: &str) {
        if let Some(symbol) = self.add_symbol(symbol) {
            if let Ok(mut data) = self.data.write() {
                data.active = symbol;
            }
        }
    }

    /// Get the active symbol
    pub fn active(&self) -> String {
        self.data.read().map(|d| d.active.clone()).unwrap_or_default()
    }

    /// Watched symbols in insertion order, filtered by a case-insensitive
    /// substring query. An empty query returns the whole watch set.
    pub fn watch_symbols(&self, query: &str) -> Vec<String> {
        let query = query.trim().to_lowercase();
        self.data
            .read()
            .map(|d| {
                d.watch_order
                    .iter()
                    .filter(|s| query.is_empty() || s.to_lowercase().contains(&query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get a snapshot of a symbol's slot
    pub fn slot(&self, symbol: &str) -> Option<MarketSlot> {
        self.data.read().ok()?.slots.get(symbol).cloned()
    }

    /// Get a symbol's latest quote
    pub fn quote(&self, symbol: &str) -> Option<QuoteData> {
        self.data.read().ok()?.slots.get(symbol)?.quote
    }

    /// Apply a quote fetch outcome for a symbol.
    ///
    /// Fresh quotes update the stored price/change and append a tick to the
    /// series. Stale quotes keep the last known values visible but are not
    /// appended, so filler never enters the history. Results for symbols no
    /// longer active still land on their own slot.
    pub fn apply_quote(&self, symbol: &str, result: QuoteResult) {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return;
        }

        if let Ok(mut data) = self.data.write() {
            if !data.slots.contains_key(&symbol) {
                data.slots
                    .insert(symbol.clone(), MarketSlot::new(&symbol, self.max_points));
                data.watch_order.push(symbol.clone());
            }
            let Some(slot) = data.slots.get_mut(&symbol) else {
                return;
            };

            match result {
                QuoteResult::Fresh(quote) => {
                    slot.quote = Some(quote);
                    slot.is_fresh = true;
                    slot.series.push_tick(now_millis(), quote.px);
                }
                QuoteResult::Stale(quote) => {
                    slot.quote = Some(quote);
                    slot.is_fresh = false;
                }
                QuoteResult::Unavailable => {
                    slot.is_fresh = false;
                }
            }
        }
    }

    /// Replace a symbol's series from a bulk history fetch.
    ///
    /// Timestamps below `1e12` are treated as seconds and scaled to
    /// milliseconds; non-finite prices are dropped together with their
    /// timestamps so the pairing invariant holds.
    pub fn apply_series(&self, symbol: &str, times: &[i64], closes: &[f64]) {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return;
        }

        let mut norm_times = Vec::with_capacity(times.len().min(closes.len()));
        let mut norm_closes = Vec::with_capacity(norm_times.capacity());
        for (&t, &c) in times.iter().zip(closes.iter()) {
            if !c.is_finite() {
                continue;
            }
            let t = if t != 0 && t.abs() < 1_000_000_000_000 { t * 1000 } else { t };
            norm_times.push(t);
            norm_closes.push(c);
        }

        if let Ok(mut data) = self.data.write() {
            if !data.slots.contains_key(&symbol) {
                data.slots
                    .insert(symbol.clone(), MarketSlot::new(&symbol, self.max_points));
                data.watch_order.push(symbol.clone());
            }
            if let Some(slot) = data.slots.get_mut(&symbol) {
                slot.series.replace(norm_times, norm_closes);
            }
        }
    }

    /// Record a timeframe selection for a symbol. Returns true when the
    /// timeframe actually changed (the caller refetches the series; old and
    /// new data are never spliced).
    pub fn select_timeframe(&self, symbol: &str, timeframe: Timeframe) -> bool {
        if let Ok(mut data) = self.data.write() {
            if let Some(slot) = data.slots.get_mut(symbol) {
                if slot.timeframe != timeframe {
                    slot.timeframe = timeframe;
                    return true;
                }
            }
        }
        false
    }

    /// Execute a paper trade at the given price.
    ///
    /// Buys move the average price by quantity weighting; sells saturate the
    /// quantity at zero and reset the average to the fill price once flat.
    /// Non-positive quantity or non-finite price is rejected as a no-op.
    pub fn execute_trade(
        &self,
        side: TradeSide,
        symbol: &str,
        qty: f64,
        px: f64,
    ) -> Option<PositionData> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() || qty <= 0.0 || !px.is_finite() {
            return None;
        }

        let region = MarketRegion::of(&symbol);
        let mut data = self.data.write().ok()?;

        let mut pos = data
            .positions
            .get(&symbol)
            .copied()
            .unwrap_or(PositionData::new(0.0, px));

        match side {
            TradeSide::Buy => {
                let new_qty = pos.qty + qty;
                pos.avg_price = (pos.avg_price * pos.qty + px * qty) / new_qty;
                pos.qty = new_qty;
            }
            TradeSide::Sell => {
                pos.qty = (pos.qty - qty).max(0.0);
                if pos.qty == 0.0 {
                    pos.avg_price = px;
                }
            }
        }

        data.positions.insert(symbol.clone(), pos);
        data.fills.push(TradeFill {
            fill_id: Uuid::new_v4().to_string(),
            symbol: symbol.clone(),
            side,
            qty,
            px,
            datetime: Utc::now(),
        });

        let verb = match side {
            TradeSide::Buy => "Bought",
            TradeSide::Sell => "Sold",
        };
        push_news(
            &mut data.news,
            format!("{}: {} {} @ {} (paper)", verb, qty, symbol, format_money(region, px)),
        );
        info!(symbol = %symbol, %side, qty, px, "paper trade executed");

        Some(pos)
    }

    /// Get a symbol's paper position
    pub fn position(&self, symbol: &str) -> Option<PositionData> {
        self.data.read().ok()?.positions.get(symbol).copied()
    }

    /// Get all paper positions with their symbols
    pub fn all_positions(&self) -> Vec<(String, PositionData)> {
        self.data
            .read()
            .map(|d| d.positions.iter().map(|(s, p)| (s.clone(), *p)).collect())
            .unwrap_or_default()
    }

    /// Unrealized P/L for a position, marked at the latest quote or, when no
    /// quote is known, at the position's own average price (flat P/L).
    pub fn position_pl(&self, symbol: &str) -> Option<f64> {
        let data = self.data.read().ok()?;
        let pos = data.positions.get(symbol)?;
        let px = data
            .slots
            .get(symbol)
            .and_then(|s| s.quote)
            .map(|q| q.px)
            .unwrap_or(pos.avg_price);
        Some(pos.unrealized_pl(px))
    }

    /// Get all executed paper fills
    pub fn all_fills(&self) -> Vec<TradeFill> {
        self.data.read().map(|d| d.fills.clone()).unwrap_or_default()
    }

    /// Register a pending alert. Empty symbol or non-finite threshold is
    /// rejected as a no-op.
    pub fn place_alert(&self, symbol: &str, condition: AlertCondition, value: f64) -> bool {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() || !value.is_finite() {
            return false;
        }

        if let Ok(mut data) = self.data.write() {
            data.alerts.push(AlertData::new(symbol.clone(), condition, value));
            push_news(
                &mut data.news,
                format!("Alert created: {} {} {}", symbol, condition, value),
            );
            true
        } else {
            false
        }
    }

    /// Get all pending alerts
    pub fn pending_alerts(&self) -> Vec<AlertData> {
        self.data.read().map(|d| d.alerts.clone()).unwrap_or_default()
    }

    /// Evaluate all pending alerts against current quotes.
    ///
    /// Every alert that triggers is removed from the pending list and pushed
    /// onto the news feed, so each fires exactly once. Returns the fired set.
    pub fn check_alerts(&self) -> Vec<AlertData> {
        let mut fired = Vec::new();

        if let Ok(mut data) = self.data.write() {
            let mut keep = Vec::with_capacity(data.alerts.len());
            let alerts = std::mem::take(&mut data.alerts);
            for alert in alerts {
                let hit = data
                    .slots
                    .get(&alert.symbol)
                    .and_then(|slot| slot.quote)
                    .is_some_and(|quote| alert.is_hit(&quote));
                if hit {
                    fired.push(alert);
                } else {
                    keep.push(alert);
                }
            }
            data.alerts = keep;

            for alert in &fired {
                push_news(
                    &mut data.news,
                    format!("Alert: {} hit {} {}", alert.symbol, alert.condition, alert.value),
                );
                info!(symbol = %alert.symbol, condition = %alert.condition, value = alert.value, "alert fired");
            }
        }

        fired
    }

    /// News feed entries, newest first
    pub fn news(&self) -> Vec<NewsItem> {
        self.data.read().map(|d| d.news.clone()).unwrap_or_default()
    }
}

impl Default for MarketEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Prepend a news entry, keeping the ring bounded.
fn push_news(news: &mut Vec<NewsItem>, text: String) {
    news.insert(0, NewsItem::new(text));
    if news.len() > MAX_NEWS {
        news.truncate(MAX_NEWS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MarketEngine {
        MarketEngine::with_max_points(1200)
    }

    #[test]
    fn test_add_and_filter_symbols() {
        let engine = engine();
        for sym in DEFAULT_SYMBOLS {
            engine.add_symbol(sym);
        }

        assert_eq!(engine.watch_symbols("").len(), DEFAULT_SYMBOLS.len());
        assert_eq!(engine.watch_symbols("vale"), vec!["VALE3".to_string()]);
        assert_eq!(engine.watch_symbols("petr").len(), 1);
        assert!(engine.watch_symbols("xyz").is_empty());
    }

    #[test]
    fn test_empty_symbol_is_noop() {
        let engine = engine();
        assert_eq!(engine.add_symbol("   "), None);
        engine.set_active("");
        assert!(engine.active().is_empty());
    }

    #[test]
    fn test_set_active_adds_unknown_symbol() {
        let engine = engine();
        engine.set_active("gold");
        assert_eq!(engine.active(), "GOLD");
        assert_eq!(engine.watch_symbols(""), vec!["GOLD".to_string()]);
    }

    #[test]
    fn test_fresh_quote_appends_tick() {
        let engine = engine();
        engine.add_symbol("TSLA");
        engine.apply_quote("TSLA", QuoteResult::Fresh(QuoteData::new(456.1, 0.003)));

        let slot = engine.slot("TSLA").unwrap();
        assert_eq!(slot.quote, Some(QuoteData::new(456.1, 0.003)));
        assert!(slot.is_fresh);
        // First tick seeds a flat run.
        assert_eq!(slot.series.len(), 10);
    }

    #[test]
    fn test_stale_quote_does_not_touch_series() {
        let engine = engine();
        engine.add_symbol("TSLA");
        engine.apply_quote("TSLA", QuoteResult::Fresh(QuoteData::new(456.1, 0.003)));
        let before = engine.slot("TSLA").unwrap().series.len();

        engine.apply_quote("TSLA", QuoteResult::Stale(QuoteData::new(456.1, 0.003)));
        let slot = engine.slot("TSLA").unwrap();
        assert!(!slot.is_fresh);
        assert_eq!(slot.series.len(), before);
    }

    #[test]
    fn test_stale_response_lands_on_its_own_symbol() {
        let engine = engine();
        engine.set_active("TSLA");
        // A late response for a symbol that is no longer active.
        engine.apply_quote("NVDA", QuoteResult::Fresh(QuoteData::new(181.93, 0.021)));
        assert_eq!(engine.quote("NVDA"), Some(QuoteData::new(181.93, 0.021)));
        assert_eq!(engine.quote("TSLA"), None);
    }

    #[test]
    fn test_apply_series_normalizes_second_timestamps() {
        let engine = engine();
        engine.add_symbol("TSLA");
        engine.apply_series("TSLA", &[1_700_000_000, 1_700_000_060], &[100.0, 101.0]);

        let slot = engine.slot("TSLA").unwrap();
        assert_eq!(slot.series.times(), &[1_700_000_000_000, 1_700_000_060_000]);
    }

    #[test]
    fn test_apply_series_drops_non_finite_pairs() {
        let engine = engine();
        engine.add_symbol("TSLA");
        engine.apply_series(
            "TSLA",
            &[1_700_000_000_000, 1_700_000_060_000, 1_700_000_120_000],
            &[100.0, f64::NAN, 102.0],
        );

        let slot = engine.slot("TSLA").unwrap();
        assert_eq!(slot.series.prices(), &[100.0, 102.0]);
        assert_eq!(slot.series.times().len(), 2);
    }

    #[test]
    fn test_select_timeframe_reports_change() {
        let engine = engine();
        engine.add_symbol("TSLA");
        assert!(engine.select_timeframe("TSLA", Timeframe::W1));
        assert!(!engine.select_timeframe("TSLA", Timeframe::W1));
        assert_eq!(engine.slot("TSLA").unwrap().timeframe, Timeframe::W1);
    }

    #[test]
    fn test_buy_updates_weighted_average() {
        let engine = engine();
        let pos = engine.execute_trade(TradeSide::Buy, "TSLA", 10.0, 100.0).unwrap();
        assert_eq!(pos.qty, 10.0);
        assert_eq!(pos.avg_price, 100.0);

        let pos = engine.execute_trade(TradeSide::Buy, "TSLA", 10.0, 110.0).unwrap();
        assert_eq!(pos.qty, 20.0);
        assert_eq!(pos.avg_price, 105.0);
    }

    #[test]
    fn test_sell_saturates_at_zero() {
        let engine = engine();
        engine.execute_trade(TradeSide::Buy, "TSLA", 10.0, 100.0);
        let pos = engine.execute_trade(TradeSide::Sell, "TSLA", 25.0, 120.0).unwrap();
        assert_eq!(pos.qty, 0.0);
        // Flattened position resets its average to the fill price.
        assert_eq!(pos.avg_price, 120.0);
    }

    #[test]
    fn test_trade_rejects_bad_input() {
        let engine = engine();
        assert!(engine.execute_trade(TradeSide::Buy, "", 10.0, 100.0).is_none());
        assert!(engine.execute_trade(TradeSide::Buy, "TSLA", 0.0, 100.0).is_none());
        assert!(engine.execute_trade(TradeSide::Buy, "TSLA", 10.0, f64::NAN).is_none());
        assert!(engine.all_fills().is_empty());
    }

    #[test]
    fn test_position_pl_marks_at_latest_quote() {
        let engine = engine();
        engine.execute_trade(TradeSide::Buy, "TSLA", 10.0, 100.0);

        // No quote yet: flat P/L at the average price.
        assert_eq!(engine.position_pl("TSLA"), Some(0.0));

        engine.apply_quote("TSLA", QuoteResult::Fresh(QuoteData::new(105.0, 0.0)));
        assert_eq!(engine.position_pl("TSLA"), Some(50.0));
    }

    #[test]
    fn test_alert_fires_exactly_once() {
        let engine = engine();
        engine.add_symbol("TSLA");
        assert!(engine.place_alert("TSLA", AlertCondition::Above, 500.0));

        engine.apply_quote("TSLA", QuoteResult::Fresh(QuoteData::new(501.0, 0.01)));
        let fired = engine.check_alerts();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].symbol, "TSLA");
        assert!(engine.pending_alerts().is_empty());

        // A second pass with the same quote fires nothing.
        assert!(engine.check_alerts().is_empty());
    }

    #[test]
    fn test_alert_without_quote_stays_pending() {
        let engine = engine();
        engine.place_alert("TSLA", AlertCondition::Above, 500.0);
        assert!(engine.check_alerts().is_empty());
        assert_eq!(engine.pending_alerts().len(), 1);
    }

    #[test]
    fn test_alert_rejects_bad_input() {
        let engine = engine();
        assert!(!engine.place_alert("", AlertCondition::Above, 500.0));
        assert!(!engine.place_alert("TSLA", AlertCondition::Above, f64::INFINITY));
        assert!(engine.pending_alerts().is_empty());
    }

    #[test]
    fn test_news_ring_is_bounded_and_newest_first() {
        let engine = engine();
        for i in 0..(MAX_NEWS + 50) {
            engine.place_alert("TSLA", AlertCondition::Above, i as f64);
        }
        let news = engine.news();
        assert_eq!(news.len(), MAX_NEWS);
        assert!(news[0].text.contains(&format!("{}", MAX_NEWS + 49)));
    }
}
