// Closed-form Black-Scholes pricing for European calls and puts, plus the vega
// and no-arbitrage bounds the implied-volatility solvers rely on. No dividend
// yield; prices are on spot with a flat continuously compounded rate.

use crate::error::{Result, SurfaceError};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};
use std::fmt;
use std::str::FromStr;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl FromStr for OptionKind {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" => Ok(OptionKind::Call),
            "put" | "p" => Ok(OptionKind::Put),
            other => Err(SurfaceError::invalid(format!(
                "invalid option type: {other}"
            ))),
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Call => write!(f, "call"),
            OptionKind::Put => write!(f, "put"),
        }
    }
}

/// Standard normal cumulative distribution function.
///
/// Evaluated through `erfc` so that both tails keep full relative precision.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x / SQRT_2)
}

/// Standard normal probability density function.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Validated inputs for a single Black-Scholes evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingParameters {
    /// Spot price of the underlying
    pub spot: f64,
    /// Strike price
    pub strike: f64,
    /// Time to maturity in years
    pub time_to_expiry: f64,
    /// Continuously compounded risk-free rate
    pub rate: f64,
    /// Annualized volatility (decimal)
    pub sigma: f64,
    pub kind: OptionKind,
}

/// Checks the market inputs shared by pricing and implied volatility inversion.
pub(crate) fn validate_market_inputs(spot: f64, strike: f64, t: f64, rate: f64) -> Result<()> {
    if !(spot > 0.0 && spot.is_finite()) {
        return Err(SurfaceError::invalid(format!(
            "spot price must be > 0 and finite, got {spot}"
        )));
    }
    if !(strike > 0.0 && strike.is_finite()) {
        return Err(SurfaceError::invalid(format!(
            "strike price must be > 0 and finite, got {strike}"
        )));
    }
    if !(t > 0.0 && t.is_finite()) {
        return Err(SurfaceError::invalid(format!(
            "time to expiry must be > 0 and finite, got {t}"
        )));
    }
    if !rate.is_finite() {
        return Err(SurfaceError::invalid(format!(
            "risk-free rate must be finite, got {rate}"
        )));
    }
    Ok(())
}

impl PricingParameters {
    /// Creates a validated parameter set.
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        rate: f64,
        sigma: f64,
        kind: OptionKind,
    ) -> Result<Self> {
        let params = Self {
            spot,
            strike,
            time_to_expiry,
            rate,
            sigma,
            kind,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        validate_market_inputs(self.spot, self.strike, self.time_to_expiry, self.rate)?;
        if !(self.sigma > 0.0 && self.sigma.is_finite()) {
            return Err(SurfaceError::invalid(format!(
                "volatility must be > 0 and finite, got {}",
                self.sigma
            )));
        }
        Ok(())
    }

    fn d1_d2(&self) -> (f64, f64) {
        let sqrt_t = self.time_to_expiry.sqrt();
        let sig_sqrt_t = self.sigma * sqrt_t;
        let d1 = ((self.spot / self.strike).ln()
            + (self.rate + 0.5 * self.sigma * self.sigma) * self.time_to_expiry)
            / sig_sqrt_t;
        (d1, d1 - sig_sqrt_t)
    }

    /// Discounted strike `K·e^(−rT)`.
    pub fn discounted_strike(&self) -> f64 {
        self.strike * (-self.rate * self.time_to_expiry).exp()
    }

    /// Black-Scholes price. Assumes the parameters were validated.
    pub fn price(&self) -> f64 {
        let (d1, d2) = self.d1_d2();
        let df_k = self.discounted_strike();
        let price = match self.kind {
            OptionKind::Call => self.spot * norm_cdf(d1) - df_k * norm_cdf(d2),
            OptionKind::Put => df_k * norm_cdf(-d2) - self.spot * norm_cdf(-d1),
        };
        // Cancellation in the deep wings can leave a tiny negative residue.
        price.max(0.0)
    }

    /// Sensitivity of the price to volatility, `S·φ(d1)·√T` (same for calls and puts).
    pub fn vega(&self) -> f64 {
        let (d1, _) = self.d1_d2();
        self.spot * norm_pdf(d1) * self.time_to_expiry.sqrt()
    }
}

/// Price of a European option under Black-Scholes assumptions.
#[allow(non_snake_case)]
pub fn bs_price(S: f64, K: f64, T: f64, r: f64, sigma: f64, kind: OptionKind) -> Result<f64> {
    Ok(PricingParameters::new(S, K, T, r, sigma, kind)?.price())
}

/// Black-Scholes vega.
#[allow(non_snake_case)]
pub fn bs_vega(S: f64, K: f64, T: f64, r: f64, sigma: f64) -> Result<f64> {
    Ok(PricingParameters::new(S, K, T, r, sigma, OptionKind::Call)?.vega())
}

/// No-arbitrage `(lower, upper)` price bounds for a European option.
///
/// Call: `[max(S − K·e^(−rT), 0), S]`; put: `[max(K·e^(−rT) − S, 0), K·e^(−rT)]`.
#[allow(non_snake_case)]
pub fn intrinsic_bounds(S: f64, K: f64, T: f64, r: f64, kind: OptionKind) -> (f64, f64) {
    let df_k = K * (-r * T).exp();
    match kind {
        OptionKind::Call => ((S - df_k).max(0.0), S),
        OptionKind::Put => ((df_k - S).max(0.0), df_k),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atm_call_matches_reference_value() {
        let price = bs_price(100.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Call).unwrap();
        assert!((price - 10.450_583_572_185_565).abs() < 1e-9, "got {price}");
    }

    #[test]
    fn norm_cdf_is_symmetric_and_centered() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
        for x in [0.1, 1.0, 2.5, 6.0] {
            assert!((norm_cdf(x) + norm_cdf(-x) - 1.0).abs() < 1e-15);
        }
        assert!(norm_cdf(-10.0) > 0.0);
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert!(bs_price(0.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Call).is_err());
        assert!(bs_price(100.0, -1.0, 1.0, 0.05, 0.2, OptionKind::Call).is_err());
        assert!(bs_price(100.0, 100.0, 0.0, 0.05, 0.2, OptionKind::Put).is_err());
        assert!(bs_price(100.0, 100.0, 1.0, 0.05, 0.0, OptionKind::Put).is_err());
        assert!(bs_vega(100.0, 100.0, 1.0, f64::NAN, 0.2).is_err());
    }

    #[test]
    fn option_kind_parses_loosely() {
        assert_eq!("CALL".parse::<OptionKind>().unwrap(), OptionKind::Call);
        assert_eq!(" p ".parse::<OptionKind>().unwrap(), OptionKind::Put);
        assert!("straddle".parse::<OptionKind>().is_err());
    }

    #[test]
    fn bounds_bracket_the_price() {
        let (lo, hi) = intrinsic_bounds(100.0, 90.0, 0.5, 0.05, OptionKind::Put);
        assert_eq!(lo, 0.0);
        let p = bs_price(100.0, 90.0, 0.5, 0.05, 0.3, OptionKind::Put).unwrap();
        assert!(p > lo && p < hi);
    }
}
