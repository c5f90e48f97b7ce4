//! Error types for pricing, implied volatility inversion and surface assembly.
//!
//! Per-quote failures (bad inputs, prices outside no-arbitrage bounds, solver
//! exhaustion) are values of [`SurfaceError`] that the surface builder attaches
//! to the affected point. Only data-source, configuration and empty-input
//! problems surface as a top-level `Err` from a surface build.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Errors raised by the pricing engine, the implied volatility solvers and the
/// surface builder.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SurfaceError {
    /// Non-positive or non-finite spot, strike, expiry, volatility or price.
    #[error("invalid parameters: {message}")]
    InvalidParameters { message: String },

    /// Observed price lies outside the no-arbitrage band, so no volatility can reproduce it.
    #[error("market price {price:.6} outside no-arbitrage bounds [{lower:.6}, {upper:.6}]")]
    PriceOutOfBounds { price: f64, lower: f64, upper: f64 },

    /// The iterative solver exhausted its budget without meeting the tolerance.
    #[error(
        "implied volatility not converged for strike {strike} at T={time_to_expiry:.6} \
         after {iterations} iterations (last vol {last_vol:.6})"
    )]
    ImpliedVolNotConverged {
        strike: f64,
        time_to_expiry: f64,
        iterations: usize,
        last_vol: f64,
    },

    /// The root is not bracketed by the configured volatility band.
    #[error(
        "implied volatility for strike {strike} at T={time_to_expiry:.6} \
         outside [{vol_min}, {vol_max}]"
    )]
    VolOutOfBounds {
        strike: f64,
        time_to_expiry: f64,
        vol_min: f64,
        vol_max: f64,
    },

    /// The market-data collaborator could not deliver spot or chain data.
    #[error("market data unavailable for {ticker}: {message}")]
    MarketDataUnavailable { ticker: String, message: String },

    /// Not enough quotes to build anything meaningful.
    #[error("insufficient data: {message}")]
    InsufficientData { message: String },

    /// Reading or writing quote / surface files failed.
    #[error("i/o error: {message}")]
    Io { message: String },

    /// Configuration could not be parsed or failed validation.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl SurfaceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SurfaceError::InvalidParameters {
            message: message.into(),
        }
    }

    pub(crate) fn io(message: impl Into<String>) -> Self {
        SurfaceError::Io {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        SurfaceError::Config {
            message: message.into(),
        }
    }

    /// Classify an error for storage on a surface point.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            SurfaceError::InvalidParameters { .. } => FailureKind::InvalidParameters,
            SurfaceError::PriceOutOfBounds { .. } => FailureKind::PriceOutOfBounds,
            SurfaceError::ImpliedVolNotConverged { .. } => FailureKind::NotConverged,
            SurfaceError::VolOutOfBounds { .. } => FailureKind::VolOutOfBounds,
            _ => FailureKind::Other,
        }
    }
}

/// Serializable classification of a per-quote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    InvalidParameters,
    PriceOutOfBounds,
    NotConverged,
    VolOutOfBounds,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SurfaceError::invalid("spot must be positive, got -1");
        assert_eq!(
            err.to_string(),
            "invalid parameters: spot must be positive, got -1"
        );

        let err = SurfaceError::ImpliedVolNotConverged {
            strike: 150.0,
            time_to_expiry: 0.25,
            iterations: 1000,
            last_vol: 0.4,
        };
        let msg = err.to_string();
        assert!(msg.contains("strike 150"));
        assert!(msg.contains("1000 iterations"));

        let err = SurfaceError::PriceOutOfBounds {
            price: 120.0,
            lower: 4.87,
            upper: 100.0,
        };
        assert!(err.to_string().contains("no-arbitrage bounds"));

        let err = SurfaceError::MarketDataUnavailable {
            ticker: "AAPL".into(),
            message: "timeout".into(),
        };
        assert_eq!(
            err.to_string(),
            "market data unavailable for AAPL: timeout"
        );
    }

    #[test]
    fn failure_kind_classifies_per_quote_errors() {
        assert_eq!(
            SurfaceError::invalid("x").failure_kind(),
            FailureKind::InvalidParameters
        );
        let err = SurfaceError::VolOutOfBounds {
            strike: 100.0,
            time_to_expiry: 1.0,
            vol_min: 0.01,
            vol_max: 5.0,
        };
        assert_eq!(err.failure_kind(), FailureKind::VolOutOfBounds);
        assert_eq!(
            SurfaceError::config("bad").failure_kind(),
            FailureKind::Other
        );
    }
}
