//! Builds a volatility surface from a synthetic, slightly noisy option chain
//! and prints it expiry by expiry.
//!
//! Run with `RUST_LOG=ivsurface=debug` to see per-quote failures.

use anyhow::Result;
use ivsurface::{bs_price, build_vol_surface, default_configs, ExpirySlice, OptionKind, OptionQuote};
use rand::Rng;
use tracing_subscriber::EnvFilter;

const SPOT: f64 = 100.0;
const RATE: f64 = 0.05;

fn smile(strike: f64, t: f64) -> f64 {
    let k = (strike / SPOT).ln();
    0.18 - 0.15 * k + 0.40 * k * k + 0.03 * t
}

fn create_demo_chain() -> Result<Vec<ExpirySlice>> {
    let mut rng = rand::thread_rng();
    let expiries = [("2025-02-21", 0.13), ("2025-05-16", 0.37), ("2025-12-19", 0.96)];
    let strikes = [80.0, 90.0, 95.0, 100.0, 105.0, 110.0, 125.0];

    let mut slices = Vec::with_capacity(expiries.len());
    for (expiry, t) in expiries {
        let mut quotes = Vec::with_capacity(strikes.len() + 1);
        for strike in strikes {
            // OTM side of the chain: puts below spot, calls above
            let kind = if strike < SPOT { OptionKind::Put } else { OptionKind::Call };
            let fair = bs_price(SPOT, strike, t, RATE, smile(strike, t), kind)?;
            let noisy = fair * (1.0 + rng.gen_range(-0.01..0.01));
            quotes.push(OptionQuote::new(strike, expiry, noisy, kind));
        }
        // A stale print above the call's upper bound
        quotes.push(OptionQuote::call(140.0, expiry, SPOT + 1.0));
        slices.push(ExpirySlice {
            expiry: expiry.to_string(),
            time_to_expiry: t,
            quotes,
        });
    }
    Ok(slices)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ivsurface=info")),
        )
        .init();

    println!("Implied Volatility Surface Demo");
    println!("===============================");

    let slices = create_demo_chain()?;
    let config = default_configs::standard().with_risk_free_rate(RATE);
    let surface = build_vol_surface(&slices, SPOT, config)?;

    for slice in &surface.slices {
        println!("\nExpiry {} (T = {:.4})", slice.expiry, slice.time_to_expiry);
        println!("{:<6} {:<8} {:<10} {:<10}", "Type", "Strike", "Price", "Implied Vol");
        println!("{}", "-".repeat(40));
        for point in &slice.points {
            let vol = match point.implied_vol() {
                Some(v) => format!("{:.2}%", v * 100.0),
                None => "-".to_string(),
            };
            println!(
                "{:<6} {:<8.1} {:<10.4} {:<10}",
                point.kind.to_string(),
                point.strike,
                point.market_price,
                vol
            );
        }
    }

    println!(
        "\nSolved {} of {} quotes",
        surface.solved_count(),
        surface.solved_count() + surface.missing_count()
    );
    for failure in surface.failures() {
        println!("  {} K={}: {}", failure.expiry, failure.strike, failure.message);
    }

    Ok(())
}
