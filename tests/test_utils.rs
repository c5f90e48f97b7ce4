#![allow(dead_code)] // Each test binary uses a different subset of these helpers

use chrono::NaiveDate;
use ivsurface::{
    bs_price, CsvChainProvider, ExpirySlice, OptionKind, OptionQuote, SurfaceConfig,
};

pub const SAMPLE_CHAIN_PATH: &str = "tests/data/sample_chain.csv";
pub const SPOT: f64 = 100.0;
pub const RATE: f64 = 0.05;

/// Valuation date matching the sample CSV snapshot
pub fn sample_as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).expect("valid date")
}

/// Load the sample option chain snapshot
pub fn load_sample_provider() -> CsvChainProvider {
    CsvChainProvider::from_path(SAMPLE_CHAIN_PATH).expect("Failed to load sample chain")
}

/// Quote whose market price is the Black-Scholes price at `vol`
pub fn quote_at_vol(
    strike: f64,
    expiry: &str,
    t: f64,
    vol: f64,
    kind: OptionKind,
) -> OptionQuote {
    let price = bs_price(SPOT, strike, t, RATE, vol, kind).expect("valid pricing inputs");
    OptionQuote::new(strike, expiry, price, kind)
}

/// Simple skewed smile: higher vol for low strikes, mild curvature
pub fn smile_vol(strike: f64, t: f64) -> f64 {
    let k = (strike / SPOT).ln();
    0.20 - 0.10 * k + 0.30 * k * k + 0.02 * t
}

/// Three expiries of synthetic call quotes priced off [`smile_vol`]
pub fn synthetic_slices() -> Vec<ExpirySlice> {
    [("2025-02-21", 0.135), ("2025-05-16", 0.37), ("2025-12-19", 0.96)]
        .iter()
        .map(|&(expiry, t)| ExpirySlice {
            expiry: expiry.to_string(),
            time_to_expiry: t,
            quotes: [110.0, 85.0, 95.0, 100.0, 105.0, 120.0]
                .iter()
                .map(|&k| quote_at_vol(k, expiry, t, smile_vol(k, t), OptionKind::Call))
                .collect(),
        })
        .collect()
}

/// Default configuration at the test rate, solved sequentially
pub fn sequential_config() -> SurfaceConfig {
    SurfaceConfig {
        parallel: false,
        ..SurfaceConfig::default().with_risk_free_rate(RATE)
    }
}

/// Default configuration at the test rate, solved on the rayon pool
pub fn parallel_config() -> SurfaceConfig {
    SurfaceConfig {
        parallel: true,
        ..SurfaceConfig::default().with_risk_free_rate(RATE)
    }
}
