//! Occurrence Log Module
//! Loads the YAML occurrence log together with its display settings.

use crate::stats::DEFAULT_ROLLING_WINDOW;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder meaning "the directory of the YAML file".
pub const HERE: &str = "__here__";

#[derive(Error, Debug)]
pub enum OccurrenceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid date `{date}`: {source}")]
    InvalidDate {
        date: String,
        source: chrono::ParseError,
    },
    #[error("Invalid time `{time}` on {date}: {source}")]
    InvalidTime {
        date: NaiveDate,
        time: String,
        source: chrono::ParseError,
    },
}

/// Marker colour selected by a trailing letter on the time string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Normal,
    Red,
    Black,
}

/// One instance of the tracked event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub category: Category,
}

impl Occurrence {
    /// Time of day in fractional hours.
    pub fn hour_of_day(&self) -> f64 {
        f64::from(self.time.hour()) + f64::from(self.time.minute()) / 60.0
    }
}

/// Dated label drawn on the count panel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Annotation {
    pub date: NaiveDate,
    pub label: String,
}

/// Raw YAML document.
#[derive(Debug, Clone, Deserialize)]
struct OccurrenceFile {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default = "default_top_axis_label")]
    top_axis_label: String,
    #[serde(default = "default_here")]
    watch_path: String,
    #[serde(default = "default_here")]
    png_path: String,
    #[serde(default = "default_png_file")]
    png_file: String,
    #[serde(default = "default_rolling_window")]
    rolling_window: usize,
    #[serde(default)]
    annotations: Vec<Annotation>,
    #[serde(default)]
    data: BTreeMap<String, Option<Vec<String>>>,
}

fn default_title() -> String {
    "Event occurrences during the day".to_string()
}

fn default_top_axis_label() -> String {
    "Occurrences in the day".to_string()
}

fn default_here() -> String {
    HERE.to_string()
}

fn default_png_file() -> String {
    "occurrences.png".to_string()
}

fn default_rolling_window() -> usize {
    DEFAULT_ROLLING_WINDOW
}

/// Display settings with every path resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub title: String,
    pub top_axis_label: String,
    pub watch_dir: PathBuf,
    pub output_path: PathBuf,
    pub rolling_window: usize,
    pub annotations: Vec<Annotation>,
}

impl DisplayConfig {
    /// Settings used when the YAML cannot be read at all.
    pub fn fallback(yaml_path: &Path) -> Self {
        let here = yaml_dir(yaml_path);
        Self {
            title: default_title(),
            top_axis_label: default_top_axis_label(),
            watch_dir: here.clone(),
            output_path: here.join(default_png_file()),
            rolling_window: default_rolling_window(),
            annotations: Vec::new(),
        }
    }
}

/// Parsed occurrence log.
#[derive(Debug, Clone)]
pub struct OccurrenceLog {
    pub config: DisplayConfig,
    pub occurrences: Vec<Occurrence>,
}

impl OccurrenceLog {
    /// Read and parse the YAML file from scratch.
    pub fn load(yaml_path: &Path) -> Result<Self, OccurrenceError> {
        let text = fs::read_to_string(yaml_path).map_err(|source| OccurrenceError::Io {
            path: yaml_path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, yaml_path)
    }

    /// Parse YAML text; relative `__here__` paths resolve against `yaml_path`.
    pub fn parse(text: &str, yaml_path: &Path) -> Result<Self, OccurrenceError> {
        let file: OccurrenceFile = serde_yaml::from_str(text)?;
        let here = yaml_dir(yaml_path);
        let resolve = |value: &str| {
            if value == HERE {
                here.clone()
            } else {
                PathBuf::from(value)
            }
        };

        let mut occurrences = Vec::new();
        for (raw_date, times) in &file.data {
            let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d").map_err(|source| {
                OccurrenceError::InvalidDate {
                    date: raw_date.clone(),
                    source,
                }
            })?;
            for raw_time in times.iter().flatten() {
                let (clean, category) = parse_time_with_category(raw_time);
                let time = parse_time(clean).map_err(|source| OccurrenceError::InvalidTime {
                    date,
                    time: raw_time.clone(),
                    source,
                })?;
                occurrences.push(Occurrence {
                    date,
                    time,
                    category,
                });
            }
        }

        let config = DisplayConfig {
            title: file.title,
            top_axis_label: file.top_axis_label,
            watch_dir: resolve(&file.watch_path),
            output_path: resolve(&file.png_path).join(&file.png_file),
            rolling_window: file.rolling_window.max(1),
            annotations: file.annotations,
        };

        Ok(Self {
            config,
            occurrences,
        })
    }
}

/// Split a time string into the bare time and its category.
///
/// `r` marks red, `z` marks black, `d` is stripped without a colour. Matching
/// ignores case; any other string is returned untouched.
pub fn parse_time_with_category(raw: &str) -> (&str, Category) {
    let raw = raw.trim();
    let Some(last) = raw.chars().last() else {
        return (raw, Category::Normal);
    };
    let stripped = &raw[..raw.len() - last.len_utf8()];
    match last.to_ascii_lowercase() {
        'r' => (stripped, Category::Red),
        'z' => (stripped, Category::Black),
        'd' => (stripped, Category::Normal),
        _ => (raw, Category::Normal),
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M").or_else(|err| {
        NaiveTime::parse_from_str(raw, "%H:%M:%S").map_err(|_| err)
    })
}

fn yaml_dir(yaml_path: &Path) -> PathBuf {
    match yaml_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
title: Coffee
png_file: coffee.png
data:
  2025-01-27: ['07:30', '12:15r', '22:05Z']
  2025-01-28: ['08:00d']
  2025-01-29:
"#;

    #[test]
    fn test_category_suffix() {
        assert_eq!(parse_time_with_category("12:15r"), ("12:15", Category::Red));
        assert_eq!(parse_time_with_category("12:15R"), ("12:15", Category::Red));
        assert_eq!(parse_time_with_category("22:05z"), ("22:05", Category::Black));
        assert_eq!(parse_time_with_category("08:00d"), ("08:00", Category::Normal));
        assert_eq!(parse_time_with_category("08:00"), ("08:00", Category::Normal));
        assert_eq!(parse_time_with_category(""), ("", Category::Normal));
    }

    #[test]
    fn test_parse_sample() {
        let log = OccurrenceLog::parse(SAMPLE, Path::new("/data/coffee.yaml")).unwrap();

        assert_eq!(log.occurrences.len(), 4);
        let red = log.occurrences[1];
        assert_eq!(red.category, Category::Red);
        assert_eq!(red.time, NaiveTime::from_hms_opt(12, 15, 0).unwrap());
        assert_eq!(log.occurrences[2].category, Category::Black);
        assert_eq!(log.occurrences[3].category, Category::Normal);
        assert!((red.hour_of_day() - 12.25).abs() < 1e-9);

        assert_eq!(log.config.title, "Coffee");
        assert_eq!(log.config.top_axis_label, "Occurrences in the day");
        assert_eq!(log.config.watch_dir, PathBuf::from("/data"));
        assert_eq!(log.config.output_path, PathBuf::from("/data/coffee.png"));
        assert_eq!(log.config.rolling_window, 7);
    }

    #[test]
    fn test_explicit_paths_and_annotations() {
        let yaml = r#"
watch_path: /tmp/watch
png_path: /tmp/out
annotations:
  - { date: 2025-08-01, label: start }
data: {}
"#;
        let log = OccurrenceLog::parse(yaml, Path::new("log.yaml")).unwrap();

        assert!(log.occurrences.is_empty());
        assert_eq!(log.config.watch_dir, PathBuf::from("/tmp/watch"));
        assert_eq!(log.config.output_path, PathBuf::from("/tmp/out/occurrences.png"));
        assert_eq!(log.config.annotations.len(), 1);
        assert_eq!(log.config.annotations[0].label, "start");
    }

    #[test]
    fn test_bare_file_name_resolves_to_current_dir() {
        let log = OccurrenceLog::parse("data: {}", Path::new("log.yaml")).unwrap();
        assert_eq!(log.config.watch_dir, PathBuf::from("."));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let error = OccurrenceLog::parse("data: [unclosed", Path::new("x.yaml")).unwrap_err();
        assert!(matches!(error, OccurrenceError::Yaml(_)));
    }

    #[test]
    fn test_invalid_time_is_an_error() {
        let error = OccurrenceLog::parse("data:\n  2025-01-01: ['25:99']\n", Path::new("x.yaml"))
            .unwrap_err();
        assert!(matches!(error, OccurrenceError::InvalidTime { .. }));
    }
}
