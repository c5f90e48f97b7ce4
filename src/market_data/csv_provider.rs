use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::provider::{InMemoryProvider, MarketDataProvider};
use crate::models::bs::OptionKind;
use crate::surface::types::{OptionChain, OptionQuote};

/// CSV row structure for option chain snapshots
#[derive(Debug, Deserialize)]
struct CsvRow {
    ticker: String,
    spot: f64,
    expiry: String,
    strike: f64,
    #[serde(default)]
    last_price: Option<f64>,
    option_type: String,
}

/// Option chains loaded from a CSV snapshot.
///
/// Expected header: `ticker,spot,expiry,strike,last_price,option_type`. Rows
/// with an empty, non-finite or non-positive `last_price` are dropped. The
/// spot of a ticker is taken from its first row; expiries keep the order in
/// which they first appear.
#[derive(Debug, Clone, Default)]
pub struct CsvChainProvider {
    inner: InMemoryProvider,
    dropped_rows: usize,
}

impl CsvChainProvider {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open option chain file {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut order: Vec<String> = Vec::new();
        let mut spots: Vec<f64> = Vec::new();
        let mut quotes: Vec<Vec<OptionQuote>> = Vec::new();
        let mut dropped_rows = 0usize;

        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.with_context(|| format!("malformed row {}", line + 1))?;
            let kind: OptionKind = row
                .option_type
                .parse()
                .with_context(|| format!("row {}", line + 1))?;

            let idx = match order.iter().position(|t| *t == row.ticker) {
                Some(idx) => idx,
                None => {
                    order.push(row.ticker.clone());
                    spots.push(row.spot);
                    quotes.push(Vec::new());
                    order.len() - 1
                }
            };

            match row.last_price {
                Some(price) if price.is_finite() && price > 0.0 => {
                    quotes[idx].push(OptionQuote::new(row.strike, row.expiry, price, kind));
                }
                _ => {
                    dropped_rows += 1;
                    debug!(
                        ticker = %row.ticker,
                        expiry = %row.expiry,
                        strike = row.strike,
                        "dropping quote without a usable last price"
                    );
                }
            }
        }

        let mut inner = InMemoryProvider::new();
        for ((ticker, spot), ticker_quotes) in order.into_iter().zip(spots).zip(quotes) {
            inner.insert(ticker, spot, OptionChain::from_quotes(ticker_quotes));
        }

        Ok(Self {
            inner,
            dropped_rows,
        })
    }

    /// Rows discarded for lacking a usable price.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.inner.tickers()
    }
}

impl MarketDataProvider for CsvChainProvider {
    fn fetch_spot(&self, ticker: &str) -> Result<f64> {
        self.inner.fetch_spot(ticker)
    }

    fn fetch_chain(&self, ticker: &str) -> Result<OptionChain> {
        self.inner.fetch_chain(ticker)
    }
}
