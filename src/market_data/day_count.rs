use chrono::NaiveDate;

use crate::error::{Result, SurfaceError};

/// Converts an expiry identifier into a year fraction as of a valuation date.
pub trait DayCount: Send + Sync {
    fn years_to_expiry(&self, expiry: &str, as_of: NaiveDate) -> Result<f64>;
}

/// Actual/365 Fixed over ISO `YYYY-MM-DD` expiry identifiers.
///
/// Counts whole calendar days, so an expiry on the valuation date yields
/// `T = 0` and past expiries yield negative values; callers filter those out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Act365Fixed;

pub const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_expiry(expiry: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(expiry.trim(), EXPIRY_DATE_FORMAT).map_err(|e| {
        SurfaceError::invalid(format!("unparseable expiry date '{expiry}': {e}"))
    })
}

impl DayCount for Act365Fixed {
    fn years_to_expiry(&self, expiry: &str, as_of: NaiveDate) -> Result<f64> {
        let expiry_date = parse_expiry(expiry)?;
        let days = (expiry_date - as_of).num_days();
        Ok(days as f64 / 365.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn act365_counts_whole_days() {
        let as_of = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let t = Act365Fixed.years_to_expiry("2025-04-01", as_of).unwrap();
        assert!((t - 90.0 / 365.0).abs() < 1e-12);

        let t = Act365Fixed.years_to_expiry("2024-12-31", as_of).unwrap();
        assert!(t < 0.0);
    }

    #[test]
    fn rejects_malformed_expiry() {
        let as_of = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(Act365Fixed.years_to_expiry("10JAN25", as_of).is_err());
    }
}
