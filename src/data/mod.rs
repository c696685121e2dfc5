//! Data module - CSV/YAML loading and series derivation

mod loader;
pub mod occurrences;
mod processor;
mod reading;

pub use loader::{parse_timestamp, LoaderError, MeterColumns, MeterLoader};
pub use occurrences::{Annotation, Category, DisplayConfig, Occurrence, OccurrenceError, OccurrenceLog};
pub use processor::{DailyRates, DataProcessor, TimePoint};
pub use reading::{Metric, Reading};
