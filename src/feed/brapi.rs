//! brapi.dev REST client: Brazilian market quotes (no API key required).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::market::object::QuoteData;
use crate::market::setting::SETTINGS;
use super::{FeedError, QuoteFeed};

const DEFAULT_BASE_URL: &str = "https://brapi.dev/api";

/// REST client for brapi.dev
pub struct BrapiClient {
    client: reqwest::Client,
    base_url: String,
}

impl BrapiClient {
    pub fn new(timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a client from global settings.
    pub fn from_settings() -> Self {
        let timeout = SETTINGS.get_int("feed.timeout_secs").unwrap_or(10) as u64;
        Self::new(timeout)
    }

    /// Override the base URL (for pointing at a mirror).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct BrapiEnvelope {
    results: Option<Vec<BrapiQuote>>,
}

/// Quote fields, in preference order for price and previous close.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrapiQuote {
    regular_market_price: Option<f64>,
    price: Option<f64>,
    close: Option<f64>,
    regular_market_previous_close: Option<f64>,
    previous_close: Option<f64>,
    open: Option<f64>,
}

impl BrapiQuote {
    fn px(&self) -> Option<f64> {
        self.regular_market_price
            .or(self.price)
            .or(self.close)
            .filter(|v| v.is_finite())
    }

    fn prev_close(&self) -> Option<f64> {
        self.regular_market_previous_close
            .or(self.previous_close)
            .or(self.open)
            .filter(|v| v.is_finite() && *v != 0.0)
    }
}

#[async_trait]
impl QuoteFeed for BrapiClient {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteData, FeedError> {
        let symbol = symbol.trim().to_uppercase();
        let url = format!("{}/quote/{}", self.base_url, symbol);
        let resp = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1m")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FeedError::Status(resp.status().as_u16()));
        }

        let payload: BrapiEnvelope = resp.json().await?;
        let first = payload
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(FeedError::Malformed("empty results"))?;

        let px = first.px().ok_or(FeedError::Malformed("missing price"))?;
        let chg = match first.prev_close() {
            Some(prev) => px / prev - 1.0,
            None => 0.0,
        };

        Ok(QuoteData::new(px, chg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_preference_order() {
        let quote = BrapiQuote {
            regular_market_price: Some(62.35),
            price: Some(60.0),
            close: Some(59.0),
            ..Default::default()
        };
        assert_eq!(quote.px(), Some(62.35));

        let quote = BrapiQuote {
            close: Some(59.0),
            ..Default::default()
        };
        assert_eq!(quote.px(), Some(59.0));

        assert_eq!(BrapiQuote::default().px(), None);
    }

    #[test]
    fn test_zero_prev_close_yields_no_change() {
        // A zero previous close would divide to infinity; the quote then
        // carries no usable reference and the change defaults to 0.
        let quote = BrapiQuote {
            regular_market_previous_close: Some(0.0),
            open: Some(61.0),
            ..Default::default()
        };
        assert_eq!(quote.prev_close(), None);

        let quote = BrapiQuote {
            previous_close: Some(61.98),
            ..Default::default()
        };
        assert_eq!(quote.prev_close(), Some(61.98));
    }

    #[test]
    fn test_envelope_deserializes_wire_shape() {
        let payload: BrapiEnvelope = serde_json::from_str(
            r#"{"results":[{"regularMarketPrice":62.35,"regularMarketPreviousClose":61.98}]}"#,
        )
        .unwrap();
        let first = &payload.results.unwrap()[0];
        assert_eq!(first.regular_market_price, Some(62.35));
        assert_eq!(first.regular_market_previous_close, Some(61.98));

        let payload: BrapiEnvelope = serde_json::from_str(r#"{"results":[]}"#).unwrap();
        assert!(payload.results.unwrap().is_empty());
    }
}
