pub mod bs;
pub mod implied;

/// Common traits shared by the implied volatility strategies
pub mod traits {
    use crate::error::Result;
    use crate::models::implied::{ImpliedVol, ImpliedVolInput};
    use crate::surface::config::SolverConfig;

    /// A root-finding strategy that inverts the Black-Scholes price.
    ///
    /// Implementations receive inputs that already passed validation and the
    /// no-arbitrage bounds check, and must return a volatility inside
    /// `[config.vol_min, config.vol_max]` on success.
    pub trait ImpliedVolStrategy: Send + Sync {
        fn name(&self) -> &'static str;

        fn solve(&self, input: &ImpliedVolInput, config: &SolverConfig) -> Result<ImpliedVol>;
    }
}

/// Utility functions for option calculations
pub mod utils {
    use std::f64::consts::PI;

    /// Brenner-Subrahmanyam volatility estimate `√(2π/T) · price / S`.
    pub fn brenner_subrahmanyam(price: f64, spot: f64, t: f64) -> f64 {
        (2.0 * PI / t).sqrt() * price / spot
    }
}
