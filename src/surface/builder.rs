use chrono::NaiveDate;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, SurfaceError};
use crate::market_data::day_count::DayCount;
use crate::models::implied::{solve_implied_vol, ImpliedVolInput};
use crate::surface::config::SurfaceConfig;
use crate::surface::types::{
    ExpirySlice, OptionChain, OptionQuote, PointOutcome, QuoteFailure, SkippedExpiry, VolSlice,
    VolSurface, VolSurfacePoint,
};

/// Assembles an implied volatility surface from quotes grouped by expiry.
///
/// Each quote is inverted independently. A quote that cannot be inverted
/// becomes a [`PointOutcome::Missing`] point carrying the reason; it never
/// aborts its expiry or the surface.
#[derive(Debug, Clone, Default)]
pub struct SurfaceBuilder {
    config: SurfaceConfig,
}

impl SurfaceBuilder {
    pub fn new(config: SurfaceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Builds a surface from expiry slices whose year fractions are already known.
    ///
    /// Slices with a non-positive or non-finite `time_to_expiry` are recorded
    /// as skipped and never reach the solver.
    pub fn build(&self, slices: &[ExpirySlice], spot: f64) -> Result<VolSurface> {
        let mut accepted = Vec::with_capacity(slices.len());
        let mut skipped = Vec::new();
        for slice in slices {
            if slice.time_to_expiry > 0.0 && slice.time_to_expiry.is_finite() {
                accepted.push(slice.clone());
            } else {
                skipped.push(skipped_expiry(
                    &slice.expiry,
                    format!("non-positive time to expiry {}", slice.time_to_expiry),
                ));
            }
        }
        self.assemble(accepted, skipped, spot)
    }

    /// Builds a surface from a raw chain, deriving each expiry's year fraction
    /// through `day_count` as of `as_of`.
    pub fn build_from_chain(
        &self,
        chain: &OptionChain,
        spot: f64,
        day_count: &dyn DayCount,
        as_of: NaiveDate,
    ) -> Result<VolSurface> {
        let mut accepted = Vec::with_capacity(chain.expiries.len());
        let mut skipped = Vec::new();
        for group in &chain.expiries {
            match day_count.years_to_expiry(&group.expiry, as_of) {
                Ok(t) if t > 0.0 && t.is_finite() => accepted.push(ExpirySlice {
                    expiry: group.expiry.clone(),
                    time_to_expiry: t,
                    quotes: group.quotes.clone(),
                }),
                Ok(t) => skipped.push(skipped_expiry(
                    &group.expiry,
                    format!("non-positive time to expiry {t}"),
                )),
                Err(e) => skipped.push(skipped_expiry(&group.expiry, e.to_string())),
            }
        }
        self.assemble(accepted, skipped, spot)
    }

    fn assemble(
        &self,
        slices: Vec<ExpirySlice>,
        skipped_expiries: Vec<SkippedExpiry>,
        spot: f64,
    ) -> Result<VolSurface> {
        self.config.validate()?;
        if !(spot > 0.0 && spot.is_finite()) {
            return Err(SurfaceError::invalid(format!(
                "spot price must be > 0 and finite, got {spot}"
            )));
        }

        let quote_count: usize = slices.iter().map(|s| s.quotes.len()).sum();
        let required = self.config.min_quotes.max(1);
        if quote_count < required {
            return Err(SurfaceError::InsufficientData {
                message: format!(
                    "{quote_count} usable quotes across {} expiries, need at least {required}",
                    slices.len()
                ),
            });
        }

        let jobs: Vec<(&ExpirySlice, &OptionQuote)> = slices
            .iter()
            .flat_map(|slice| slice.quotes.iter().map(move |quote| (slice, quote)))
            .collect();
        let mut points = self.solve_all(&jobs, spot).into_iter();

        let vol_slices: Vec<VolSlice> = slices
            .iter()
            .map(|slice| VolSlice {
                expiry: slice.expiry.clone(),
                time_to_expiry: slice.time_to_expiry,
                points: points.by_ref().take(slice.quotes.len()).collect(),
            })
            .collect();

        let surface = VolSurface {
            spot,
            risk_free_rate: self.config.risk_free_rate,
            slices: vol_slices,
            skipped_expiries,
        };

        let solved = surface.solved_count();
        info!(
            expiries = surface.slices.len(),
            skipped = surface.skipped_expiries.len(),
            solved,
            missing = surface.missing_count(),
            method = self.config.solver.method.strategy().name(),
            "volatility surface built"
        );
        if solved == 0 {
            warn!("no quote produced an implied volatility");
        }

        Ok(surface)
    }

    /// Solves every job, returning points in job order.
    #[cfg(feature = "parallel")]
    fn solve_all(&self, jobs: &[(&ExpirySlice, &OptionQuote)], spot: f64) -> Vec<VolSurfacePoint> {
        if self.config.parallel {
            jobs.par_iter()
                .map(|(slice, quote)| self.solve_point(slice, quote, spot))
                .collect()
        } else {
            jobs.iter()
                .map(|(slice, quote)| self.solve_point(slice, quote, spot))
                .collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn solve_all(&self, jobs: &[(&ExpirySlice, &OptionQuote)], spot: f64) -> Vec<VolSurfacePoint> {
        jobs.iter()
            .map(|(slice, quote)| self.solve_point(slice, quote, spot))
            .collect()
    }

    fn solve_point(&self, slice: &ExpirySlice, quote: &OptionQuote, spot: f64) -> VolSurfacePoint {
        let input = ImpliedVolInput::new(
            quote.market_price,
            spot,
            quote.strike,
            slice.time_to_expiry,
            self.config.risk_free_rate,
            quote.kind,
        );

        let outcome = match solve_implied_vol(&input, &self.config.solver) {
            Ok(iv) => PointOutcome::Solved {
                vol: iv.vol,
                iterations: iv.iterations,
            },
            Err(e) => {
                debug!(
                    strike = quote.strike,
                    expiry = %slice.expiry,
                    error = %e,
                    "implied volatility not computed"
                );
                PointOutcome::Missing(QuoteFailure::from_error(&e, quote.strike, &slice.expiry))
            }
        };

        VolSurfacePoint {
            expiry: slice.expiry.clone(),
            time_to_expiry: slice.time_to_expiry,
            strike: quote.strike,
            kind: quote.kind,
            market_price: quote.market_price,
            outcome,
        }
    }
}

fn skipped_expiry(expiry: &str, reason: String) -> SkippedExpiry {
    warn!(expiry, reason = %reason, "skipping expiry");
    SkippedExpiry {
        expiry: expiry.to_string(),
        reason,
    }
}
