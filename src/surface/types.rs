use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{FailureKind, Result, SurfaceError};
use crate::models::bs::OptionKind;

/// A single observed option price, as delivered by the market-data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Strike price
    pub strike: f64,
    /// Expiry identifier (ISO date `YYYY-MM-DD` for dated chains)
    pub expiry: String,
    /// Observed market price (last trade)
    pub market_price: f64,
    /// Call or put
    pub kind: OptionKind,
}

impl OptionQuote {
    pub fn new(strike: f64, expiry: impl Into<String>, market_price: f64, kind: OptionKind) -> Self {
        Self {
            strike,
            expiry: expiry.into(),
            market_price,
            kind,
        }
    }

    pub fn call(strike: f64, expiry: impl Into<String>, market_price: f64) -> Self {
        Self::new(strike, expiry, market_price, OptionKind::Call)
    }

    pub fn put(strike: f64, expiry: impl Into<String>, market_price: f64) -> Self {
        Self::new(strike, expiry, market_price, OptionKind::Put)
    }
}

/// Quotes sharing one expiry, in source order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpiryQuotes {
    pub expiry: String,
    pub quotes: Vec<OptionQuote>,
}

/// Option chain grouped by expiry, in the order the source listed expiries
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionChain {
    pub expiries: Vec<ExpiryQuotes>,
}

impl OptionChain {
    /// Groups quotes by expiry, keeping first-appearance order of expiries and
    /// source order within each expiry.
    pub fn from_quotes(quotes: impl IntoIterator<Item = OptionQuote>) -> Self {
        let mut expiries: Vec<ExpiryQuotes> = Vec::new();
        for quote in quotes {
            match expiries.iter_mut().find(|g| g.expiry == quote.expiry) {
                Some(group) => group.quotes.push(quote),
                None => expiries.push(ExpiryQuotes {
                    expiry: quote.expiry.clone(),
                    quotes: vec![quote],
                }),
            }
        }
        Self { expiries }
    }

    pub fn quote_count(&self) -> usize {
        self.expiries.iter().map(|g| g.quotes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.quote_count() == 0
    }
}

/// One expiry ready for solving: quotes plus their year fraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirySlice {
    pub expiry: String,
    /// Time to expiry in years, strictly positive
    pub time_to_expiry: f64,
    pub quotes: Vec<OptionQuote>,
}

/// Why a quote has no implied volatility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteFailure {
    pub kind: FailureKind,
    pub strike: f64,
    pub expiry: String,
    pub message: String,
}

impl QuoteFailure {
    pub fn from_error(err: &SurfaceError, strike: f64, expiry: &str) -> Self {
        Self {
            kind: err.failure_kind(),
            strike,
            expiry: expiry.to_string(),
            message: err.to_string(),
        }
    }
}

/// Implied volatility result attached to a surface point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointOutcome {
    Solved { vol: f64, iterations: usize },
    Missing(QuoteFailure),
}

/// One quote's place on the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolSurfacePoint {
    pub expiry: String,
    pub time_to_expiry: f64,
    pub strike: f64,
    pub kind: OptionKind,
    pub market_price: f64,
    pub outcome: PointOutcome,
}

impl VolSurfacePoint {
    /// The implied volatility, or `None` if the quote could not be inverted.
    pub fn implied_vol(&self) -> Option<f64> {
        match self.outcome {
            PointOutcome::Solved { vol, .. } => Some(vol),
            PointOutcome::Missing(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&QuoteFailure> {
        match &self.outcome {
            PointOutcome::Solved { .. } => None,
            PointOutcome::Missing(failure) => Some(failure),
        }
    }
}

/// All points for one expiry, in input strike order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolSlice {
    pub expiry: String,
    pub time_to_expiry: f64,
    pub points: Vec<VolSurfacePoint>,
}

/// An expiry dropped before solving, e.g. already expired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedExpiry {
    pub expiry: String,
    pub reason: String,
}

/// Implied volatility surface grouped by expiry
///
/// Slices keep the order in which expiries were supplied. Quotes that could
/// not be inverted stay on the surface as [`PointOutcome::Missing`] points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolSurface {
    pub spot: f64,
    pub risk_free_rate: f64,
    pub slices: Vec<VolSlice>,
    pub skipped_expiries: Vec<SkippedExpiry>,
}

impl VolSurface {
    /// Every point, expiry by expiry.
    pub fn points(&self) -> impl Iterator<Item = &VolSurfacePoint> {
        self.slices.iter().flat_map(|s| s.points.iter())
    }

    pub fn failures(&self) -> impl Iterator<Item = &QuoteFailure> {
        self.points().filter_map(VolSurfacePoint::failure)
    }

    pub fn solved_count(&self) -> usize {
        self.points().filter(|p| p.implied_vol().is_some()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.points().filter(|p| p.implied_vol().is_none()).count()
    }

    pub fn slice(&self, expiry: &str) -> Option<&VolSlice> {
        self.slices.iter().find(|s| s.expiry == expiry)
    }

    /// `(strike, T, vol)` triples for solved points only, the shape a 3D
    /// scatter renderer consumes.
    pub fn to_triples(&self) -> Vec<(f64, f64, f64)> {
        self.points()
            .filter_map(|p| p.implied_vol().map(|vol| (p.strike, p.time_to_expiry, vol)))
            .collect()
    }

    /// Writes the solved triples as CSV with a `strike,time_to_expiry,implied_vol` header.
    pub fn write_triples_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        let io_err = |e: csv::Error| SurfaceError::io(format!("failed to write surface csv: {e}"));
        wtr.write_record(["strike", "time_to_expiry", "implied_vol"])
            .map_err(io_err)?;
        for (strike, t, vol) in self.to_triples() {
            wtr.serialize((strike, t, vol)).map_err(io_err)?;
        }
        wtr.flush()
            .map_err(|e| SurfaceError::io(format!("failed to flush surface csv: {e}")))?;
        Ok(())
    }
}
