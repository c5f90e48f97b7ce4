//! Implied volatility inversion
//!
//! Recovers the volatility that makes the Black-Scholes price match an observed
//! market price. Three strategies share one entry point, [`solve_implied_vol`],
//! selected through [`SolverMethod`]:
//!
//! - **Damped secant** (default): two seeds from the Brenner-Subrahmanyam
//!   approximation, a residual-scaled secant step and clamping to the
//!   volatility band. Survives regions where vega collapses.
//! - **Newton-Raphson**: classic vega-driven update, fast near the money but
//!   gives up when vega is negligible.
//! - **Brent**: bracketed search over the whole volatility band.
//!
//! Inputs are validated and checked against the no-arbitrage price bounds
//! before any iteration starts, so a zero price or a call quoted above spot is
//! reported as a failure instead of converging onto a clamp boundary.

mod brent;
mod newton;
mod secant;

pub use brent::Brent;
pub use newton::NewtonRaphson;
pub use secant::DampedSecant;

use crate::error::{Result, SurfaceError};
use crate::models::bs::{intrinsic_bounds, validate_market_inputs, OptionKind, PricingParameters};
use crate::models::traits::ImpliedVolStrategy;
use crate::models::utils::brenner_subrahmanyam;
use crate::surface::config::{SolverConfig, SolverMethod};
use serde::{Deserialize, Serialize};

/// Market observation to invert
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVolInput {
    pub market_price: f64,
    pub spot: f64,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub rate: f64,
    pub kind: OptionKind,
}

impl ImpliedVolInput {
    pub fn new(
        market_price: f64,
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        rate: f64,
        kind: OptionKind,
    ) -> Self {
        Self {
            market_price,
            spot,
            strike,
            time_to_expiry,
            rate,
            kind,
        }
    }

    /// Pricing parameters at a trial volatility.
    pub(crate) fn at(&self, sigma: f64) -> PricingParameters {
        PricingParameters {
            spot: self.spot,
            strike: self.strike,
            time_to_expiry: self.time_to_expiry,
            rate: self.rate,
            sigma,
            kind: self.kind,
        }
    }

    /// Model price minus market price at `sigma`.
    pub(crate) fn residual(&self, sigma: f64) -> f64 {
        self.at(sigma).price() - self.market_price
    }

    pub(crate) fn not_converged(&self, iterations: usize, last_vol: f64) -> SurfaceError {
        SurfaceError::ImpliedVolNotConverged {
            strike: self.strike,
            time_to_expiry: self.time_to_expiry,
            iterations,
            last_vol,
        }
    }
}

/// A converged implied volatility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVol {
    /// Annualized volatility, always inside the configured clamp band
    pub vol: f64,
    /// Update steps taken before convergence
    pub iterations: usize,
}

impl SolverMethod {
    /// The strategy implementing this method.
    pub fn strategy(self) -> &'static dyn ImpliedVolStrategy {
        match self {
            SolverMethod::DampedSecant => &DampedSecant,
            SolverMethod::NewtonRaphson => &NewtonRaphson,
            SolverMethod::Brent => &Brent,
        }
    }
}

/// Initial volatility guess shared by the secant and Newton strategies.
///
/// `max(seed_floor, √(2π/T)·price/S)`, scaled down when spot is above strike and
/// up when it is below.
pub fn initial_guess(input: &ImpliedVolInput, config: &SolverConfig) -> f64 {
    let seed = brenner_subrahmanyam(input.market_price, input.spot, input.time_to_expiry)
        .max(config.seed_floor);
    if input.spot > input.strike {
        seed * config.itm_seed_factor
    } else if input.spot < input.strike {
        seed * config.otm_seed_factor
    } else {
        seed
    }
}

fn check_price_bounds(input: &ImpliedVolInput, config: &SolverConfig) -> Result<()> {
    if !(input.market_price > 0.0 && input.market_price.is_finite()) {
        return Err(SurfaceError::invalid(format!(
            "market price must be > 0 and finite, got {}",
            input.market_price
        )));
    }
    let (lower, upper) = intrinsic_bounds(
        input.spot,
        input.strike,
        input.time_to_expiry,
        input.rate,
        input.kind,
    );
    if input.market_price >= upper || input.market_price < lower - config.tolerance {
        return Err(SurfaceError::PriceOutOfBounds {
            price: input.market_price,
            lower,
            upper,
        });
    }
    Ok(())
}

/// Solves for the implied volatility of one quote with the configured strategy.
///
/// # Errors
///
/// * [`SurfaceError::InvalidParameters`] for non-positive spot, strike, expiry or price
/// * [`SurfaceError::PriceOutOfBounds`] when no volatility can reproduce the price
/// * [`SurfaceError::ImpliedVolNotConverged`] when the iteration budget runs out
/// * [`SurfaceError::VolOutOfBounds`] when Brent finds no root inside the band
///
/// # Example
///
/// ```rust
/// use ivsurface::{solve_implied_vol, ImpliedVolInput, OptionKind, SolverConfig};
///
/// let input = ImpliedVolInput::new(10.4506, 100.0, 100.0, 1.0, 0.05, OptionKind::Call);
/// let iv = solve_implied_vol(&input, &SolverConfig::default()).unwrap();
/// assert!((iv.vol - 0.2).abs() < 1e-4);
/// ```
pub fn solve_implied_vol(input: &ImpliedVolInput, config: &SolverConfig) -> Result<ImpliedVol> {
    validate_market_inputs(input.spot, input.strike, input.time_to_expiry, input.rate)?;
    check_price_bounds(input, config)?;
    config.method.strategy().solve(input, config)
}
