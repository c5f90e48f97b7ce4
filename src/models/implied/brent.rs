use roots::{find_root_brent, SearchError, SimpleConvergency};
use std::cell::Cell;

use super::{ImpliedVol, ImpliedVolInput};
use crate::error::{Result, SurfaceError};
use crate::models::traits::ImpliedVolStrategy;
use crate::surface::config::SolverConfig;

/// Brent's method over `[vol_min, vol_max]`.
///
/// Needs no seed and cannot leave the band, but requires the residual to change
/// sign across it: a price whose implied volatility lies outside the band is
/// reported as [`SurfaceError::VolOutOfBounds`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Brent;

impl ImpliedVolStrategy for Brent {
    fn name(&self) -> &'static str {
        "brent"
    }

    fn solve(&self, input: &ImpliedVolInput, config: &SolverConfig) -> Result<ImpliedVol> {
        let evaluations = Cell::new(0usize);
        let objective = |sigma: f64| {
            evaluations.set(evaluations.get() + 1);
            input.residual(sigma)
        };
        let mut convergency = SimpleConvergency {
            eps: config.tolerance,
            max_iter: config.max_iterations,
        };

        match find_root_brent(config.vol_min, config.vol_max, &objective, &mut convergency) {
            Ok(vol) => Ok(ImpliedVol {
                vol: vol.clamp(config.vol_min, config.vol_max),
                iterations: evaluations.get(),
            }),
            Err(SearchError::NoBracketing) => Err(SurfaceError::VolOutOfBounds {
                strike: input.strike,
                time_to_expiry: input.time_to_expiry,
                vol_min: config.vol_min,
                vol_max: config.vol_max,
            }),
            Err(_) => Err(input.not_converged(evaluations.get(), f64::NAN)),
        }
    }
}
