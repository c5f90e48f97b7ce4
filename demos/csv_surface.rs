//! Loads an option chain snapshot from CSV and writes the surface triples to stdout.
//!
//! Usage: `cargo run --example csv_surface -- [path] [ticker] [as_of]`

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ivsurface::{
    build_surface_from_provider, default_configs, parse_expiry, Act365Fixed, CsvChainProvider,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ivsurface=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .unwrap_or_else(|| "tests/data/sample_chain.csv".to_string());
    let ticker = args.next().unwrap_or_else(|| "XYZ".to_string());
    let as_of: NaiveDate = match args.next() {
        Some(date) => parse_expiry(&date)?,
        None => NaiveDate::from_ymd_opt(2025, 1, 2).context("invalid default valuation date")?,
    };

    let provider = CsvChainProvider::from_path(&path)?;
    eprintln!(
        "Loaded {path}: {} dropped rows without a usable price",
        provider.dropped_rows()
    );

    let surface = build_surface_from_provider(
        &provider,
        &ticker,
        &Act365Fixed,
        as_of,
        &default_configs::standard(),
    )?;

    for skipped in &surface.skipped_expiries {
        eprintln!("Skipped {}: {}", skipped.expiry, skipped.reason);
    }

    surface.write_triples_csv(std::io::stdout().lock())?;
    Ok(())
}
