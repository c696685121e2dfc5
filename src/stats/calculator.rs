//! Statistics Calculator Module
//! Daily counts, rolling means and axis ranges.

use crate::data::Occurrence;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Default rolling window for the occurrence counts, in days.
pub const DEFAULT_ROLLING_WINDOW: usize = 7;

/// Handles the small amount of arithmetic the charts need.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Number of occurrences per date, ordered by date. Dates without any
    /// occurrence are absent.
    pub fn occurrences_per_day(occurrences: &[Occurrence]) -> Vec<(NaiveDate, usize)> {
        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for occurrence in occurrences {
            *counts.entry(occurrence.date).or_default() += 1;
        }
        counts.into_iter().collect()
    }

    /// Centred rolling mean over `window` positions.
    ///
    /// A position is `NaN` unless the whole window fits inside the input and
    /// holds no `NaN`. For even windows the extra element sits on the left.
    pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
        let n = values.len();
        if window == 0 {
            return vec![f64::NAN; n];
        }
        let after = (window - 1) / 2;
        let before = window - 1 - after;

        (0..n)
            .map(|i| {
                if i < before || i + after >= n {
                    return f64::NAN;
                }
                let slice = &values[i - before..=i + after];
                if slice.iter().any(|v| v.is_nan()) {
                    f64::NAN
                } else {
                    slice.iter().sum::<f64>() / window as f64
                }
            })
            .collect()
    }

    /// Min/max over finite values, padded by `margin` of the span on both
    /// sides. Falls back to `0..1` when nothing is finite.
    pub fn padded_range(values: impl IntoIterator<Item = f64>, margin: f64) -> (f64, f64) {
        Self::padded_range_or(values, margin, |value| value.abs().max(1.0) * margin.max(0.05))
    }

    /// Like [`Self::padded_range`], but a single value is padded by exactly
    /// `fixed_pad` on each side.
    pub fn padded_range_fixed(
        values: impl IntoIterator<Item = f64>,
        margin: f64,
        fixed_pad: f64,
    ) -> (f64, f64) {
        Self::padded_range_or(values, margin, |_| fixed_pad)
    }

    fn padded_range_or(
        values: impl IntoIterator<Item = f64>,
        margin: f64,
        flat_pad: impl Fn(f64) -> f64,
    ) -> (f64, f64) {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !min.is_finite() {
            return (0.0, 1.0);
        }
        let span = max - min;
        let pad = if span > 0.0 { span * margin } else { flat_pad(min) };
        (min - pad, max + pad)
    }
}
