//! Meter CSV Loader Module
//! Loads meter readings from CSV using Polars.

use super::{Metric, Reading};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Timestamp column `{0}` not found")]
    MissingTimestampColumn(String),
}

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Column names of the meter CSV. Lookup ignores case.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeterColumns {
    pub timestamp: String,
    pub water: String,
    pub gas: String,
    pub electricity_day: String,
    pub electricity_night: String,
    pub solar_small: String,
    pub solar_large: String,
}

impl Default for MeterColumns {
    fn default() -> Self {
        Self {
            timestamp: "Date_Time".to_string(),
            water: "Water".to_string(),
            gas: "Gas".to_string(),
            electricity_day: "eDag".to_string(),
            electricity_night: "eNacht".to_string(),
            solar_small: "SMA_3000".to_string(),
            solar_large: "SMA_7000".to_string(),
        }
    }
}

impl MeterColumns {
    pub fn name(&self, metric: Metric) -> &str {
        match metric {
            Metric::Water => &self.water,
            Metric::Gas => &self.gas,
            Metric::ElectricityDay => &self.electricity_day,
            Metric::ElectricityNight => &self.electricity_night,
            Metric::SolarSmall => &self.solar_small,
            Metric::SolarLarge => &self.solar_large,
        }
    }
}

/// Loads the full reading history from a meter CSV.
#[derive(Debug, Clone, Default)]
pub struct MeterLoader {
    columns: MeterColumns,
}

impl MeterLoader {
    pub fn new(columns: MeterColumns) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &MeterColumns {
        &self.columns
    }

    /// Load a CSV file, returning readings ordered by time.
    pub fn load_csv(&self, file_path: &Path) -> Result<Vec<Reading>, LoaderError> {
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .with_comment_prefix(Some("#".into()))
            .finish()?
            .collect()?;

        debug!(path = %file_path.display(), rows = df.height(), "csv loaded");
        self.readings_from_dataframe(&df)
    }

    /// Convert a loaded DataFrame into readings.
    pub fn readings_from_dataframe(&self, df: &DataFrame) -> Result<Vec<Reading>, LoaderError> {
        let timestamp_col = Self::find_column(df, &self.columns.timestamp)
            .ok_or_else(|| LoaderError::MissingTimestampColumn(self.columns.timestamp.clone()))?;
        let timestamps = df.column(&timestamp_col)?.cast(&DataType::String)?;
        let timestamps = timestamps.as_materialized_series().str()?;

        // (row index, reading) for every row with a usable timestamp
        let mut rows: Vec<(usize, Reading)> = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let raw = timestamps.get(i);
            match raw.and_then(parse_timestamp) {
                Some(timestamp) => rows.push((i, Reading::empty(timestamp))),
                None => warn!(row = i + 1, value = ?raw, "skipping row with invalid timestamp"),
            }
        }

        for metric in Metric::ALL {
            let values = self.numeric_values(df, metric)?;
            for (row, reading) in rows.iter_mut() {
                reading.set_value(metric, values[*row]);
            }
        }

        let mut readings: Vec<Reading> = rows.into_iter().map(|(_, reading)| reading).collect();
        readings.sort_by_key(|r| r.timestamp);
        Ok(readings)
    }

    /// Values of one metric column; missing column or cells become `NaN`.
    fn numeric_values(&self, df: &DataFrame, metric: Metric) -> Result<Vec<f64>, LoaderError> {
        let wanted = self.columns.name(metric);
        let Some(name) = Self::find_column(df, wanted) else {
            warn!(column = wanted, "column not found, using NaN");
            return Ok(vec![f64::NAN; df.height()]);
        };

        let value_f64 = df.column(&name)?.cast(&DataType::Float64)?;
        let value_ca = value_f64.f64()?;
        Ok((0..df.height())
            .map(|i| value_ca.get(i).unwrap_or(f64::NAN))
            .collect())
    }

    fn find_column(df: &DataFrame, wanted: &str) -> Option<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .find(|name| name.trim().eq_ignore_ascii_case(wanted))
    }
}

/// Parse a meter timestamp (`YYYY-MM-DD HH:MM[:SS]` or a bare date).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
