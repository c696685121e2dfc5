//! Home Metrics - meter reading and occurrence log charts
//!
//! Loads a meter-reading CSV or an occurrence YAML log, derives per-day
//! series and renders them as PNG charts or in a desktop viewer. A debounced
//! file watch regenerates the charts whenever the source file changes.

pub mod charts;
pub mod cli;
pub mod commands;
pub mod data;
pub mod gui;
pub mod observability;
pub mod stats;
pub mod watch;
