//! Charts module - Chart data and rendering

mod occurrences;
mod plotter;
mod renderer;

pub use occurrences::OccurrenceChartRenderer;
pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};

use crate::data::{DataProcessor, Metric, Reading, TimePoint};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::path::Path;

/// Meter charts available as PNG files and viewer tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterChart {
    Water,
    Gas,
    GasPerDay,
    Electricity,
    ElectricityPerDay,
    SolarRatio,
    YearOverYear,
}

impl MeterChart {
    pub const ALL: [MeterChart; 7] = [
        MeterChart::Water,
        MeterChart::Gas,
        MeterChart::GasPerDay,
        MeterChart::Electricity,
        MeterChart::ElectricityPerDay,
        MeterChart::SolarRatio,
        MeterChart::YearOverYear,
    ];

    pub fn title(self) -> &'static str {
        match self {
            MeterChart::Water => "Water consumption",
            MeterChart::Gas => "Gas consumption",
            MeterChart::GasPerDay => "Gas consumption per day",
            MeterChart::Electricity => "Electricity consumption",
            MeterChart::ElectricityPerDay => "Electricity consumption per day",
            MeterChart::SolarRatio => "Solar panels",
            MeterChart::YearOverYear => "Yearly consumption",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            MeterChart::Water => "water.png",
            MeterChart::Gas => "gas.png",
            MeterChart::GasPerDay => "gas_per_day.png",
            MeterChart::Electricity => "electricity.png",
            MeterChart::ElectricityPerDay => "electricity_per_day.png",
            MeterChart::SolarRatio => "solar_ratio.png",
            MeterChart::YearOverYear => "year_over_year.png",
        }
    }

    /// Derive the plotted series from the reading history.
    pub fn build(self, readings: &[Reading]) -> ChartData {
        let panels = match self {
            MeterChart::Water => vec![Panel::dated(
                "Volume [m³]",
                vec![Self::named("Water", DataProcessor::metric_series(readings, Metric::Water))],
            )],
            MeterChart::Gas => vec![Panel::dated(
                "Gas [m³]",
                vec![Self::named("Gas", DataProcessor::metric_series(readings, Metric::Gas))],
            )],
            MeterChart::GasPerDay => vec![Panel::dated(
                "Gas per day [m³/day]",
                vec![Self::named("Gas", DataProcessor::metric_per_day(readings, Metric::Gas))],
            )],
            MeterChart::Electricity => vec![Panel::dated(
                "Electricity [kWh]",
                vec![Self::named(
                    "Day + night",
                    DataProcessor::series(readings, Reading::electricity_total),
                )],
            )],
            MeterChart::ElectricityPerDay => vec![Panel::dated(
                "Electricity per day [kWh/day]",
                vec![
                    Self::named("Grid", DataProcessor::electricity_per_day(readings)),
                    Self::named("Grid + solar", DataProcessor::household_per_day(readings)),
                ],
            )],
            MeterChart::SolarRatio => vec![Panel::dated(
                "SMA 7000 / SMA 3000",
                vec![Self::named("Ratio", DataProcessor::solar_ratio(readings))],
            )],
            MeterChart::YearOverYear => [
                (Metric::Gas, "Yearly gas [m³]"),
                (Metric::ElectricityDay, "Yearly electricity (day) [kWh]"),
                (Metric::Water, "Yearly water [m³]"),
            ]
            .into_iter()
            .map(|(metric, y_label)| Panel {
                y_label: y_label.to_string(),
                x_axis: XAxis::DayOfYear,
                series: DataProcessor::year_over_year(readings, metric)
                    .into_iter()
                    .map(|(year, points)| NamedSeries {
                        name: year.to_string(),
                        points,
                    })
                    .collect(),
            })
            .collect(),
        };

        ChartData { kind: self, panels }
    }

    fn named(name: &str, points: Vec<TimePoint>) -> NamedSeries {
        NamedSeries {
            name: name.to_string(),
            points: points
                .into_iter()
                .map(|(timestamp, value)| (timestamp_to_day(timestamp), value))
                .collect(),
        }
    }
}

/// How x values of a panel are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XAxis {
    /// Days since 0001-01-01 (see [`day_number`]).
    Date,
    DayOfYear,
}

#[derive(Debug, Clone)]
pub struct NamedSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl NamedSeries {
    /// Points with both coordinates finite.
    pub fn finite_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    }
}

/// One set of axes.
#[derive(Debug, Clone)]
pub struct Panel {
    pub y_label: String,
    pub x_axis: XAxis,
    pub series: Vec<NamedSeries>,
}

impl Panel {
    fn dated(y_label: &str, series: Vec<NamedSeries>) -> Self {
        Self {
            y_label: y_label.to_string(),
            x_axis: XAxis::Date,
            series,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.finite_points().next().is_none())
    }
}

/// Everything needed to draw one meter chart.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub kind: MeterChart,
    pub panels: Vec<Panel>,
}

/// Date as a plain number for chart axes.
pub fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Timestamp as fractional days on the same scale as [`day_number`].
pub fn timestamp_to_day(timestamp: NaiveDateTime) -> f64 {
    day_number(timestamp.date()) + f64::from(timestamp.num_seconds_from_midnight()) / 86_400.0
}

/// Axis label for a value produced by [`day_number`].
pub fn format_day(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    NaiveDate::from_num_days_from_ce_opt(value.floor() as i32)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Output path of `chart` inside `dir`.
pub fn chart_path(dir: &Path, chart: MeterChart) -> std::path::PathBuf {
    dir.join(chart.file_name())
}
