//! Stats module - counts, rolling means and ranges

mod calculator;

pub use calculator::{StatsCalculator, DEFAULT_ROLLING_WINDOW};
