//! Timeframe selection: mapping between UI labels, backend query tokens and
//! the upstream candle query parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Candle resolution requested from the history upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Intraday resolution in minutes
    Minutes(u32),
    /// Daily candles
    Daily,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Minutes(m) => write!(f, "{}", m),
            Resolution::Daily => write!(f, "D"),
        }
    }
}

/// Candle query parameters derived from a timeframe: resolution plus the
/// lookback window in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandleQuery {
    pub resolution: Resolution,
    pub lookback_secs: i64,
}

/// User-selectable chart timeframe.
///
/// The set is closed: arbitrary strings are not timeframes. Parsing accepts
/// both the UI button labels and the backend tokens, case-insensitively, and
/// falls back to the one-day view for anything unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    M1,
    H1,
    H5,
    H12,
    #[default]
    D1,
    W1,
    Mo1,
    Mo2,
    Mo3,
    Ytd,
    Y1,
    Y5,
    Max,
}

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

impl Timeframe {
    /// All timeframes in display order.
    pub fn all() -> [Timeframe; 13] {
        [
            Timeframe::M1,
            Timeframe::H1,
            Timeframe::H5,
            Timeframe::H12,
            Timeframe::D1,
            Timeframe::W1,
            Timeframe::Mo1,
            Timeframe::Mo2,
            Timeframe::Mo3,
            Timeframe::Ytd,
            Timeframe::Y1,
            Timeframe::Y5,
            Timeframe::Max,
        ]
    }

    /// Parse a label or token. Unrecognized input falls back to the one-day
    /// default rather than erroring.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "1m" => Timeframe::M1,
            "1h" => Timeframe::H1,
            "5h" => Timeframe::H5,
            "12h" => Timeframe::H12,
            "24h" | "1d" => Timeframe::D1,
            "1w" | "1s" => Timeframe::W1,
            "1mo" | "1mth" => Timeframe::Mo1,
            "2mo" | "2m" => Timeframe::Mo2,
            "3mo" | "3m" => Timeframe::Mo3,
            "ytd" => Timeframe::Ytd,
            "1y" => Timeframe::Y1,
            "5y" => Timeframe::Y5,
            "max" => Timeframe::Max,
            _ => Timeframe::D1,
        }
    }

    /// Backend query token for the series endpoint.
    pub fn token(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::H1 => "1h",
            Timeframe::H5 => "5h",
            Timeframe::H12 => "12h",
            Timeframe::D1 => "24h",
            Timeframe::W1 => "1w",
            Timeframe::Mo1 => "1mo",
            Timeframe::Mo2 => "2mo",
            Timeframe::Mo3 => "3mo",
            Timeframe::Ytd => "ytd",
            Timeframe::Y1 => "1y",
            Timeframe::Y5 => "5y",
            Timeframe::Max => "max",
        }
    }

    /// UI label for button highlighting.
    ///
    /// Parsing is lossy (several labels collapse onto the same token), but
    /// every label produced here parses back to its own timeframe. The month
    /// label is "1Mo" rather than "1M" because case-insensitive parsing
    /// cannot tell "1M" apart from the one-minute token.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::H1 => "1h",
            Timeframe::H5 => "5h",
            Timeframe::H12 => "12h",
            Timeframe::D1 => "1D",
            Timeframe::W1 => "1W",
            Timeframe::Mo1 => "1Mo",
            Timeframe::Mo2 => "2M",
            Timeframe::Mo3 => "3M",
            Timeframe::Ytd => "YTD",
            Timeframe::Y1 => "1Y",
            Timeframe::Y5 => "5Y",
            Timeframe::Max => "MAX",
        }
    }

    /// Point count the chart viewport resets to when this timeframe is
    /// selected.
    pub fn target_window(&self) -> usize {
        match self {
            Timeframe::M1 => 15,
            Timeframe::H1 => 60,
            Timeframe::H5 => 60,
            Timeframe::H12 => 96,
            Timeframe::D1 => 120,
            Timeframe::W1 => 336,
            Timeframe::Mo1 => 180,
            Timeframe::Mo2 => 70,
            Timeframe::Mo3 => 100,
            Timeframe::Ytd => 260,
            Timeframe::Y1 => 260,
            Timeframe::Y5 => 600,
            Timeframe::Max => 1200,
        }
    }

    /// Upstream candle query parameters: resolution and lookback window.
    pub fn candle_query(&self) -> CandleQuery {
        let (resolution, lookback_secs) = match self {
            Timeframe::M1 => (Resolution::Minutes(1), 15 * MINUTE),
            Timeframe::H1 => (Resolution::Minutes(1), 8 * HOUR),
            Timeframe::H5 => (Resolution::Minutes(5), DAY),
            Timeframe::H12 => (Resolution::Minutes(15), DAY),
            Timeframe::D1 => (Resolution::Minutes(5), 10 * HOUR),
            Timeframe::W1 => (Resolution::Minutes(30), 7 * DAY),
            Timeframe::Mo1 => (Resolution::Minutes(60), 32 * DAY),
            Timeframe::Mo2 => (Resolution::Daily, 70 * DAY),
            Timeframe::Mo3 => (Resolution::Daily, 100 * DAY),
            Timeframe::Ytd => (Resolution::Daily, 365 * DAY),
            Timeframe::Y1 => (Resolution::Daily, 365 * DAY),
            Timeframe::Y5 => (Resolution::Daily, 5 * 365 * DAY),
            Timeframe::Max => (Resolution::Daily, 10 * 365 * DAY),
        };
        CandleQuery {
            resolution,
            lookback_secs,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
