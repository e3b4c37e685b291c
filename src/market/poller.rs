//! Periodic quote refresh loop.
//!
//! One tokio task wakes on a fixed interval, refreshes the active symbol
//! first and the background watch set after it, then evaluates alerts. A
//! boolean guard drops ticks that fire while the previous cycle is still in
//! flight; nothing queues up behind a slow upstream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::feed::FeedRouter;
use super::engine::MarketEngine;
use super::setting::SETTINGS;

/// Quote refresh loop
pub struct QuotePoller {
    engine: Arc<MarketEngine>,
    feeds: Arc<FeedRouter>,
    interval: Duration,
    stagger: Duration,
    busy: AtomicBool,
}

impl QuotePoller {
    /// Create a poller with intervals from global settings.
    pub fn new(engine: Arc<MarketEngine>, feeds: Arc<FeedRouter>) -> Self {
        let interval = SETTINGS.get_int("poll.interval_ms").unwrap_or(6000) as u64;
        let stagger = SETTINGS.get_int("poll.stagger_ms").unwrap_or(120) as u64;
        Self::with_intervals(
            engine,
            feeds,
            Duration::from_millis(interval),
            Duration::from_millis(stagger),
        )
    }

    /// Create a poller with explicit intervals.
    pub fn with_intervals(
        engine: Arc<MarketEngine>,
        feeds: Arc<FeedRouter>,
        interval: Duration,
        stagger: Duration,
    ) -> Self {
        Self {
            engine,
            feeds,
            interval,
            stagger,
            busy: AtomicBool::new(false),
        }
    }

    /// Run one refresh cycle.
    ///
    /// Returns false when a previous cycle was still in flight and this one
    /// was skipped. The active symbol refreshes first; background symbols
    /// follow with a short pause between requests.
    pub async fn poll_once(&self) -> bool {
        if self.busy.swap(true, Ordering::SeqCst) {
            debug!("refresh cycle still in flight, tick skipped");
            return false;
        }

        let active = self.engine.active();
        if !active.is_empty() {
            self.refresh_symbol(&active).await;
        }

        for symbol in self.engine.watch_symbols("") {
            if symbol == active {
                continue;
            }
            time::sleep(self.stagger).await;
            self.refresh_symbol(&symbol).await;
        }

        let fired = self.engine.check_alerts();
        if !fired.is_empty() {
            info!(count = fired.len(), "alerts fired during refresh");
        }

        self.busy.store(false, Ordering::SeqCst);
        true
    }

    async fn refresh_symbol(&self, symbol: &str) {
        let last = self.engine.quote(symbol);
        let result = self.feeds.quote(symbol, last).await;
        self.engine.apply_quote(symbol, result);
    }

    /// Run the refresh loop forever. Missed ticks are skipped, not replayed.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{CandleFeed, CandleSeries, FeedError, QuoteFeed};
    use crate::market::constant::AlertCondition;
    use crate::market::object::QuoteData;
    use async_trait::async_trait;

    struct SlowQuotes {
        px: f64,
        delay: Duration,
    }

    #[async_trait]
    impl QuoteFeed for SlowQuotes {
        async fn fetch_quote(&self, _symbol: &str) -> Result<QuoteData, FeedError> {
            time::sleep(self.delay).await;
            Ok(QuoteData::new(self.px, 0.01))
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

    fn poller(px: f64, delay: Duration) -> QuotePoller {
        let engine = Arc::new(MarketEngine::with_max_points(1200));
        let feed = Arc::new(SlowQuotes { px, delay });
        let feeds = Arc::new(FeedRouter::new(feed.clone(), feed, Arc::new(NoCandles), 1200));
        QuotePoller::with_intervals(
            engine,
            feeds,
            Duration::from_millis(6000),
            Duration::from_millis(1),
        )
    }

    #[tokio::test]
    async fn test_cycle_refreshes_all_watched_symbols() {
        let poller = poller(456.1, Duration::ZERO);
        poller.engine.set_active("TSLA");
        poller.engine.add_symbol("NVDA");
        poller.engine.add_symbol("VALE3");

        assert!(poller.poll_once().await);

        for sym in ["TSLA", "NVDA", "VALE3"] {
            assert_eq!(poller.engine.quote(sym), Some(QuoteData::new(456.1, 0.01)));
        }
    }

    #[tokio::test]
    async fn test_overlapping_cycle_is_skipped() {
        let poller = Arc::new(poller(456.1, Duration::from_millis(50)));
        poller.engine.set_active("TSLA");

        let first = poller.clone();
        let second = poller.clone();
        let (a, b) = tokio::join!(
            async move { first.poll_once().await },
            async move { second.poll_once().await },
        );

        // Exactly one of the two concurrent ticks runs.
        assert!(a ^ b);
        // The guard is released afterwards.
        assert!(poller.poll_once().await);
    }

    #[tokio::test]
    async fn test_alerts_evaluated_after_refresh() {
        let poller = poller(501.0, Duration::ZERO);
        poller.engine.set_active("TSLA");
        poller.engine.place_alert("TSLA", AlertCondition::Above, 500.0);

        assert!(poller.poll_once().await);
        assert!(poller.engine.pending_alerts().is_empty());
    }
}
