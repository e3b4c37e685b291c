//! General constant enums used in the dashboard engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Market region an instrument trades in.
///
/// Resolved once per symbol and carried alongside it, instead of re-deriving
/// the region from the symbol string at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketRegion {
    /// United States (Finnhub upstream, USD formatting)
    Us,
    /// Brazil (brapi.dev upstream, BRL formatting)
    Br,
}

impl MarketRegion {
    /// Resolve the region from a ticker symbol.
    ///
    /// Brazilian tickers carry a trailing digit (VALE3, PETR4, ITUB4);
    /// everything else routes to the US upstream.
    pub fn of(symbol: &str) -> Self {
        if symbol.chars().last().is_some_and(|c| c.is_ascii_digit()) {
            MarketRegion::Br
        } else {
            MarketRegion::Us
        }
    }

    /// Currency code used for price formatting in this region.
    pub fn currency(&self) -> &'static str {
        match self {
            MarketRegion::Us => "USD",
            MarketRegion::Br => "BRL",
        }
    }
}

impl fmt::Display for MarketRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketRegion::Us => write!(f, "US"),
            MarketRegion::Br => write!(f, "BR"),
        }
    }
}

/// Side of a paper trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Condition a price alert triggers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertCondition {
    /// Last price at or above the threshold
    Above,
    /// Last price at or below the threshold
    Below,
    /// Day change (percent) at or above the threshold
    ChangeUp,
    /// Day change (percent) at or below the threshold
    ChangeDown,
}

impl AlertCondition {
    /// Parse from the wire token used by the UI ("above", "changeUp", ...).
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "above" => Some(AlertCondition::Above),
            "below" => Some(AlertCondition::Below),
            "changeUp" => Some(AlertCondition::ChangeUp),
            "changeDown" => Some(AlertCondition::ChangeDown),
            _ => None,
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertCondition::Above => write!(f, "above"),
            AlertCondition::Below => write!(f, "below"),
            AlertCondition::ChangeUp => write!(f, "changeUp"),
            AlertCondition::ChangeDown => write!(f, "changeDown"),
        }
    }
}
