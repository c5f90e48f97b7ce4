use tracing::debug;

use super::{initial_guess, ImpliedVol, ImpliedVolInput};
use crate::error::Result;
use crate::models::traits::ImpliedVolStrategy;
use crate::surface::config::SolverConfig;

/// Damped secant iteration.
///
/// Each step is `σ₂ = σ₁ − d·f₁·(σ₁ − σ₀)/(f₁ − f₀)` with damping
/// `d = min(1, residual_threshold / max(|f₁|, tol))`, so large residuals take
/// short steps and the update tends to a plain secant step near the root.
/// When the secant slope collapses (flat price in σ, deep in the wings or at
/// tiny maturities) the second iterate is nudged by `perturbation` instead of
/// dividing by ~0. Every pass, nudges included, counts toward
/// `max_iterations`; only real updates are reported as iterations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DampedSecant;

impl ImpliedVolStrategy for DampedSecant {
    fn name(&self) -> &'static str {
        "damped_secant"
    }

    fn solve(&self, input: &ImpliedVolInput, config: &SolverConfig) -> Result<ImpliedVol> {
        let tol = config.tolerance;
        let mut sigma_0 = initial_guess(input, config);
        let mut sigma_1 = sigma_0 + config.second_seed_offset;
        let mut steps = 0usize;

        for _ in 0..config.max_iterations {
            let f_0 = input.residual(sigma_0);
            let f_1 = input.residual(sigma_1);
            if !(f_0.is_finite() && f_1.is_finite()) {
                return Err(input.not_converged(steps, sigma_1));
            }

            let denom = f_1 - f_0;
            if denom.abs() < config.denominator_floor {
                sigma_1 += config.perturbation;
                continue;
            }

            let damping = (config.residual_threshold / f_1.abs().max(tol)).min(1.0);
            let sigma_new = (sigma_1 - damping * f_1 * (sigma_1 - sigma_0) / denom)
                .clamp(config.vol_min, config.vol_max);
            steps += 1;

            if !sigma_new.is_finite() {
                return Err(input.not_converged(steps, sigma_1));
            }
            if (sigma_new - sigma_1).abs() < tol {
                return Ok(ImpliedVol {
                    vol: sigma_new,
                    iterations: steps,
                });
            }

            sigma_0 = sigma_1;
            sigma_1 = sigma_new;
        }

        debug!(
            strike = input.strike,
            t = input.time_to_expiry,
            steps,
            last_vol = sigma_1,
            "secant iteration budget exhausted"
        );
        Err(input.not_converged(steps, sigma_1))
    }
}
