//! Commands module - one entry point per CLI subcommand

pub mod meters;
pub mod occurrences;
