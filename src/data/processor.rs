//! Data Processor Module
//! Derives per-day consumption series from the reading history.

use super::{Metric, Reading};
use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

/// A timestamped value of a derived series.
pub type TimePoint = (NaiveDateTime, f64);

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Per-day rates for the interval ending at `timestamp`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DailyRates {
    pub timestamp: NaiveDateTime,
    pub interval_days: f64,
    pub water: f64,
    pub gas: f64,
    pub electricity: f64,
    pub solar: f64,
    /// Grid electricity plus solar yield
    pub household: f64,
}

/// Stateless transformations from readings to chart series.
pub struct DataProcessor;

impl DataProcessor {
    /// Raw value of `value_of` for every reading.
    pub fn series(readings: &[Reading], value_of: impl Fn(&Reading) -> f64) -> Vec<TimePoint> {
        readings.iter().map(|r| (r.timestamp, value_of(r))).collect()
    }

    pub fn metric_series(readings: &[Reading], metric: Metric) -> Vec<TimePoint> {
        Self::series(readings, |r| r.value(metric))
    }

    /// Elapsed time between two readings in days.
    pub fn elapsed_days(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
        (to - from).num_seconds() as f64 / SECONDS_PER_DAY
    }

    /// First difference divided by elapsed days, one entry per consecutive
    /// pair of readings. Fewer than two readings gives an empty series.
    pub fn per_day(readings: &[Reading], value_of: impl Fn(&Reading) -> f64) -> Vec<TimePoint> {
        readings
            .windows(2)
            .map(|pair| {
                let days = Self::elapsed_days(pair[0].timestamp, pair[1].timestamp);
                (pair[1].timestamp, (value_of(&pair[1]) - value_of(&pair[0])) / days)
            })
            .collect()
    }

    pub fn metric_per_day(readings: &[Reading], metric: Metric) -> Vec<TimePoint> {
        Self::per_day(readings, |r| r.value(metric))
    }

    /// Grid electricity (day + night) per day.
    pub fn electricity_per_day(readings: &[Reading]) -> Vec<TimePoint> {
        Self::per_day(readings, Reading::electricity_total)
    }

    /// Total household electricity per day: grid import plus solar yield.
    pub fn household_per_day(readings: &[Reading]) -> Vec<TimePoint> {
        Self::per_day(readings, |r| r.electricity_total() + r.solar_total())
    }

    /// Ratio of the large to the small inverter yield (≈ 32 / 14 panels).
    pub fn solar_ratio(readings: &[Reading]) -> Vec<TimePoint> {
        Self::series(readings, |r| r.solar_large / r.solar_small)
    }

    /// All per-day rates for every interval.
    pub fn daily_rates(readings: &[Reading]) -> Vec<DailyRates> {
        readings
            .windows(2)
            .map(|pair| {
                let (prev, curr) = (&pair[0], &pair[1]);
                let days = Self::elapsed_days(prev.timestamp, curr.timestamp);
                let rate = |value_of: fn(&Reading) -> f64| (value_of(curr) - value_of(prev)) / days;
                let electricity = rate(Reading::electricity_total);
                let solar = rate(Reading::solar_total);
                DailyRates {
                    timestamp: curr.timestamp,
                    interval_days: days,
                    water: rate(|r| r.water),
                    gas: rate(|r| r.gas),
                    electricity,
                    solar,
                    household: electricity + solar,
                }
            })
            .collect()
    }

    /// Per calendar year, the value relative to the year's first known value,
    /// keyed by day-of-year.
    pub fn year_over_year(
        readings: &[Reading],
        metric: Metric,
    ) -> BTreeMap<i32, Vec<(f64, f64)>> {
        let mut offsets: BTreeMap<i32, f64> = BTreeMap::new();
        let mut years: BTreeMap<i32, Vec<(f64, f64)>> = BTreeMap::new();

        for reading in readings {
            let value = reading.value(metric);
            if value.is_nan() {
                continue;
            }
            let year = reading.timestamp.year();
            let offset = *offsets.entry(year).or_insert(value);
            years
                .entry(year)
                .or_default()
                .push((f64::from(reading.timestamp.ordinal()), value - offset));
        }

        years
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn reading(timestamp: NaiveDateTime, water: f64) -> Reading {
        Reading { water, ..Reading::empty(timestamp) }
    }

    #[test]
    fn test_per_day_example() {
        let readings = [reading(at(1, 0), 100.0), reading(at(3, 0), 106.0)];
        let rates = DataProcessor::metric_per_day(&readings, Metric::Water);

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].0, at(3, 0));
        assert_abs_diff_eq!(rates[0].1, 3.0);
    }

    #[test]
    fn test_per_day_has_one_entry_per_interval() {
        let readings = [
            reading(at(1, 0), 10.0),
            reading(at(1, 12), 11.0),
            reading(at(2, 12), 15.0),
            reading(at(5, 12), 18.0),
        ];
        let rates = DataProcessor::metric_per_day(&readings, Metric::Water);

        assert_eq!(rates.len(), readings.len() - 1);
        assert_abs_diff_eq!(rates[0].1, 2.0);
        assert_abs_diff_eq!(rates[1].1, 4.0);
        assert_abs_diff_eq!(rates[2].1, 1.0);
    }

    #[test]
    fn test_per_day_needs_two_readings() {
        assert!(DataProcessor::metric_per_day(&[], Metric::Gas).is_empty());
        let single = [reading(at(1, 0), 1.0)];
        assert!(DataProcessor::metric_per_day(&single, Metric::Water).is_empty());
        assert!(DataProcessor::daily_rates(&single).is_empty());
    }

    #[test]
    fn test_per_day_propagates_nan() {
        let readings = [reading(at(1, 0), f64::NAN), reading(at(2, 0), 4.0)];
        let rates = DataProcessor::metric_per_day(&readings, Metric::Water);
        assert!(rates[0].1.is_nan());
    }

    #[test]
    fn test_household_adds_solar_yield() {
        let mut first = Reading::empty(at(1, 0));
        first.electricity_day = 100.0;
        first.electricity_night = 50.0;
        first.solar_small = 10.0;
        first.solar_large = 20.0;
        let mut second = Reading::empty(at(3, 0));
        second.electricity_day = 104.0;
        second.electricity_night = 52.0;
        second.solar_small = 12.0;
        second.solar_large = 24.0;
        let readings = [first, second];

        assert_abs_diff_eq!(DataProcessor::electricity_per_day(&readings)[0].1, 3.0);
        assert_abs_diff_eq!(DataProcessor::household_per_day(&readings)[0].1, 6.0);

        let rates = DataProcessor::daily_rates(&readings);
        assert_abs_diff_eq!(rates[0].interval_days, 2.0);
        assert_abs_diff_eq!(rates[0].solar, 3.0);
        assert_abs_diff_eq!(rates[0].household, 6.0);
        assert_abs_diff_eq!(DataProcessor::solar_ratio(&readings)[1].1, 2.0);
    }

    #[test]
    fn test_year_over_year_offsets_each_year() {
        let new_year = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let readings = [
            reading(at(1, 0), 100.0),
            reading(at(11, 0), 120.0),
            reading(new_year, 500.0),
            reading(new_year + chrono::Duration::days(9), 530.0),
        ];
        let years = DataProcessor::year_over_year(&readings, Metric::Water);

        assert_eq!(years.len(), 2);
        assert_eq!(years[&2024], vec![(1.0, 0.0), (11.0, 20.0)]);
        assert_eq!(years[&2025], vec![(2.0, 0.0), (11.0, 30.0)]);
    }
}
