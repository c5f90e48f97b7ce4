use anyhow::{anyhow, Result};
use std::collections::HashMap;

use crate::surface::types::OptionChain;

/// Source of spot prices and option chains.
///
/// Implementations own any I/O and retry policy; the surface builder never
/// retries a failed fetch.
pub trait MarketDataProvider {
    /// Latest spot price of the underlying.
    fn fetch_spot(&self, ticker: &str) -> Result<f64>;

    /// Option chain grouped by expiry.
    fn fetch_chain(&self, ticker: &str) -> Result<OptionChain>;
}

/// Provider backed by snapshots held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    snapshots: HashMap<String, (f64, OptionChain)>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the snapshot for `ticker`.
    pub fn with_snapshot(mut self, ticker: impl Into<String>, spot: f64, chain: OptionChain) -> Self {
        self.insert(ticker, spot, chain);
        self
    }

    pub fn insert(&mut self, ticker: impl Into<String>, spot: f64, chain: OptionChain) {
        self.snapshots.insert(ticker.into(), (spot, chain));
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.snapshots.keys().map(String::as_str)
    }

    fn snapshot(&self, ticker: &str) -> Result<&(f64, OptionChain)> {
        self.snapshots
            .get(ticker)
            .ok_or_else(|| anyhow!("no snapshot loaded for ticker {ticker}"))
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn fetch_spot(&self, ticker: &str) -> Result<f64> {
        Ok(self.snapshot(ticker)?.0)
    }

    fn fetch_chain(&self, ticker: &str) -> Result<OptionChain> {
        Ok(self.snapshot(ticker)?.1.clone())
    }
}
