use tracing::debug;

use super::{initial_guess, ImpliedVol, ImpliedVolInput};
use crate::error::Result;
use crate::models::traits::ImpliedVolStrategy;
use crate::surface::config::SolverConfig;

/// Newton-Raphson on vega: `σₙ₊₁ = σₙ − (BS(σₙ) − price) / vega(σₙ)`.
///
/// Converges in a handful of steps near the money. Gives up as soon as vega
/// drops below `min_vega`, which is exactly where the damped secant keeps going.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewtonRaphson;

impl ImpliedVolStrategy for NewtonRaphson {
    fn name(&self) -> &'static str {
        "newton_raphson"
    }

    fn solve(&self, input: &ImpliedVolInput, config: &SolverConfig) -> Result<ImpliedVol> {
        let mut sigma = initial_guess(input, config).clamp(config.vol_min, config.vol_max);

        for iteration in 1..=config.max_iterations {
            let params = input.at(sigma);
            let diff = params.price() - input.market_price;
            let vega = params.vega();

            if !(vega >= config.min_vega) {
                debug!(
                    strike = input.strike,
                    t = input.time_to_expiry,
                    vega,
                    sigma,
                    "vega too small for a Newton step"
                );
                return Err(input.not_converged(iteration - 1, sigma));
            }

            let sigma_new = (sigma - diff / vega).clamp(config.vol_min, config.vol_max);
            if !sigma_new.is_finite() {
                return Err(input.not_converged(iteration, sigma));
            }
            if (sigma_new - sigma).abs() < config.tolerance {
                return Ok(ImpliedVol {
                    vol: sigma_new,
                    iterations: iteration,
                });
            }
            sigma = sigma_new;
        }

        Err(input.not_converged(config.max_iterations, sigma))
    }
}
