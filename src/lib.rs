//! # ivsurface: European Option Pricing and Implied Volatility Surfaces
//!
//! `ivsurface` prices European options with the Black-Scholes formula and
//! inverts it quote by quote to build an implied volatility surface from
//! observed market prices.
//!
//! ## Core Features
//!
//! - **Pricing**: closed-form call/put prices and vega, Φ evaluated through `erfc`
//! - **Implied volatility**: damped secant (default), Newton-Raphson or Brent,
//!   selected per invocation through [`SolverMethod`]
//! - **Surface assembly**: fail-soft per quote, ordered by expiry then strike,
//!   optionally solved in parallel on the rayon pool
//! - **Market-data seams**: [`MarketDataProvider`] and [`DayCount`] traits with
//!   in-memory, CSV and ACT/365 implementations
//!
//! ## Quick Start
//!
//! ```rust
//! use ivsurface::{build_vol_surface, default_configs, ExpirySlice, OptionQuote};
//!
//! let slices = vec![ExpirySlice {
//!     expiry: "2025-06-20".to_string(),
//!     time_to_expiry: 0.5,
//!     quotes: vec![
//!         OptionQuote::call(90.0, "2025-06-20", 14.2),
//!         OptionQuote::call(100.0, "2025-06-20", 7.0),
//!         OptionQuote::call(110.0, "2025-06-20", 0.0), // not invertible
//!     ],
//! }];
//!
//! let surface = build_vol_surface(&slices, 100.0, default_configs::standard())?;
//! assert_eq!(surface.solved_count(), 2);
//! assert_eq!(surface.missing_count(), 1);
//! # Ok::<(), ivsurface::SurfaceError>(())
//! ```
//!
//! ## Configuration Presets
//!
//! - `standard()`: tolerance 1e-6, 1000 iterations, r = 5%
//! - `precise()`: tolerance 1e-10, 5000 iterations
//! - `fast()`: tolerance 1e-4, 200 iterations

// ================================================================================================
// MODULES
// ================================================================================================

pub mod error;
pub mod market_data;
pub mod models;
pub mod surface;

// ================================================================================================
// IMPORTS
// ================================================================================================

use chrono::NaiveDate;
use tracing::info;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Errors
pub use error::{FailureKind, Result, SurfaceError};

// Pricing engine
pub use models::bs::{
    bs_price, bs_vega, intrinsic_bounds, norm_cdf, norm_pdf, OptionKind, PricingParameters,
};

// Implied volatility solvers
pub use models::implied::{
    initial_guess, solve_implied_vol, Brent, DampedSecant, ImpliedVol, ImpliedVolInput,
    NewtonRaphson,
};
pub use models::traits::ImpliedVolStrategy;

// Configuration and surface types
pub use surface::builder::SurfaceBuilder;
pub use surface::config::{SolverConfig, SolverMethod, SurfaceConfig};
pub use surface::types::{
    ExpiryQuotes, ExpirySlice, OptionChain, OptionQuote, PointOutcome, QuoteFailure,
    SkippedExpiry, VolSlice, VolSurface, VolSurfacePoint,
};

// Market data collaborators
pub use market_data::{
    parse_expiry, Act365Fixed, CsvChainProvider, DayCount, InMemoryProvider, MarketDataProvider,
};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured surface settings for common use cases.
///
/// - [`standard()`]: the defaults, suitable for end-of-day surfaces
/// - [`precise()`]: tight tolerance for research and validation
/// - [`fast()`]: loose tolerance for quick previews
pub mod default_configs {
    use crate::surface::config::SurfaceConfig;

    /// Standard configuration.
    ///
    /// **Characteristics:**
    /// - Damped secant solver
    /// - Convergence tolerance: 1e-6
    /// - Maximum iterations: 1,000
    /// - Volatility band: [0.01, 5.0]
    /// - Risk-free rate: 5%
    ///
    /// # Example
    ///
    /// ```rust
    /// use ivsurface::default_configs;
    ///
    /// let config = default_configs::standard();
    /// assert_eq!(config.solver.max_iterations, 1000);
    /// ```
    pub fn standard() -> SurfaceConfig {
        SurfaceConfig::standard()
    }

    /// High-precision configuration.
    ///
    /// **Characteristics:**
    /// - Convergence tolerance: 1e-10
    /// - Maximum iterations: 5,000
    pub fn precise() -> SurfaceConfig {
        SurfaceConfig::precise()
    }

    /// Quick preview configuration.
    ///
    /// **Characteristics:**
    /// - Convergence tolerance: 1e-4
    /// - Maximum iterations: 200
    pub fn fast() -> SurfaceConfig {
        SurfaceConfig::fast()
    }
}

/// Build an implied volatility surface from expiry slices with known year fractions.
///
/// # Arguments
///
/// * `slices` - Quotes grouped by expiry, each with a strictly positive `time_to_expiry`.
///   Slices with `T <= 0` are recorded in [`VolSurface::skipped_expiries`].
/// * `spot` - Spot price of the underlying
/// * `config` - Risk-free rate and solver settings, see [`default_configs`]
///
/// # Errors
///
/// Only whole-surface problems are errors: invalid spot or configuration, or
/// fewer usable quotes than `config.min_quotes`. Quotes that cannot be
/// inverted are kept as missing points.
pub fn build_vol_surface(
    slices: &[ExpirySlice],
    spot: f64,
    config: SurfaceConfig,
) -> Result<VolSurface> {
    SurfaceBuilder::new(config).build(slices, spot)
}

/// Fetch spot and chain for `ticker` from `provider` and build its surface.
///
/// Year fractions come from `day_count` as of `as_of`; expiries that are
/// unparseable or not in the future are skipped. Provider failures are
/// reported as [`SurfaceError::MarketDataUnavailable`] and are not retried.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use ivsurface::{
///     build_surface_from_provider, default_configs, Act365Fixed, InMemoryProvider, OptionChain,
///     OptionQuote,
/// };
///
/// let chain = OptionChain::from_quotes(vec![
///     OptionQuote::call(95.0, "2025-03-21", 7.9),
///     OptionQuote::call(105.0, "2025-03-21", 2.6),
/// ]);
/// let provider = InMemoryProvider::new().with_snapshot("XYZ", 100.0, chain);
/// let as_of = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
///
/// let surface = build_surface_from_provider(
///     &provider,
///     "XYZ",
///     &Act365Fixed,
///     as_of,
///     &default_configs::standard(),
/// )?;
/// assert_eq!(surface.solved_count(), 2);
/// # Ok::<(), ivsurface::SurfaceError>(())
/// ```
pub fn build_surface_from_provider(
    provider: &dyn MarketDataProvider,
    ticker: &str,
    day_count: &dyn DayCount,
    as_of: NaiveDate,
    config: &SurfaceConfig,
) -> Result<VolSurface> {
    let unavailable = |e: anyhow::Error| SurfaceError::MarketDataUnavailable {
        ticker: ticker.to_string(),
        message: format!("{e:#}"),
    };

    let spot = provider.fetch_spot(ticker).map_err(unavailable)?;
    let chain = provider.fetch_chain(ticker).map_err(unavailable)?;
    info!(
        ticker,
        spot,
        expiries = chain.expiries.len(),
        quotes = chain.quote_count(),
        "market data loaded"
    );

    SurfaceBuilder::new(config.clone()).build_from_chain(&chain, spot, day_count, as_of)
}
