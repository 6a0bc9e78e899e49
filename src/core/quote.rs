//! Quote types and the upstream provider abstraction

use crate::core::error::FetchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// A base/quote currency combination such as USD against BRL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_uppercase(),
            quote: quote.to_uppercase(),
        }
    }

    /// Path segment used when requesting the pair upstream, e.g. `USD-BRL`.
    pub fn path(&self) -> String {
        format!("{}-{}", self.base, self.quote)
    }

    /// Key the upstream uses for the pair in its response map, e.g. `USDBRL`.
    pub fn key(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self::new("USD", "BRL")
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl FromStr for CurrencyPair {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = |code: &str| !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric());
        match s.split_once('-') {
            Some((base, quote)) if valid(base) && valid(quote) => Ok(Self::new(base, quote)),
            _ => Err(anyhow::anyhow!("Invalid currency pair: {}", s)),
        }
    }
}

/// Full quote record as emitted by the upstream provider. Numeric values are
/// kept as the provider's strings, untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawQuote {
    pub code: String,
    pub codein: String,
    pub name: String,
    pub high: String,
    pub low: String,
    #[serde(rename = "varBid")]
    pub var_bid: String,
    #[serde(rename = "pctChange")]
    pub pct_change: String,
    pub bid: String,
    pub ask: String,
    pub timestamp: String,
    pub create_date: String,
}

/// The public contract between the quote service and its callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteProjection {
    pub bid: String,
}

impl From<&RawQuote> for QuoteProjection {
    fn from(quote: &RawQuote) -> Self {
        Self {
            bid: quote.bid.clone(),
        }
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches the current quote for `pair`, abandoning the call once
    /// `deadline` has elapsed since it started.
    async fn fetch_quote(
        &self,
        pair: &CurrencyPair,
        deadline: Duration,
    ) -> Result<RawQuote, FetchError>;
}
