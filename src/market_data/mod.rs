//! Market-data seams
//!
//! The surface builder does not fetch anything itself. Spot prices and option
//! chains come through [`MarketDataProvider`], year fractions through
//! [`DayCount`]. Network vendors live outside this crate; the in-memory and
//! CSV providers here cover snapshots, tests and offline replays.

pub mod csv_provider;
pub mod day_count;
pub mod provider;

pub use csv_provider::CsvChainProvider;
pub use day_count::{parse_expiry, Act365Fixed, DayCount, EXPIRY_DATE_FORMAT};
pub use provider::{InMemoryProvider, MarketDataProvider};
