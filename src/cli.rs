use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::data::MeterColumns;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Log debug output (`RUST_LOG` overrides).
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render the occurrence chart, then redraw it whenever the YAML changes.
    #[clap(name = "occurrences")]
    Occurrences(OccurrencesArgs),

    /// Meter reading charts.
    #[clap(name = "meters")]
    Meters(MetersArgs),
}

#[derive(Parser)]
pub struct DebounceArgs {
    /// Minimum number of seconds between two redraws.
    #[clap(long = "debounce-secs", env = "HOME_METRICS_DEBOUNCE_SECS", default_value = "5")]
    pub debounce_secs: u64,
}

impl DebounceArgs {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }
}

#[derive(Parser)]
pub struct OccurrencesArgs {
    /// YAML occurrence log.
    pub yaml: PathBuf,

    #[clap(flatten)]
    pub debounce: DebounceArgs,
}

#[derive(Parser)]
pub struct MetersArgs {
    #[command(subcommand)]
    pub command: MetersCommand,
}

#[derive(Subcommand)]
pub enum MetersCommand {
    /// Render every meter chart once.
    Render(RenderArgs),

    /// Render, then re-render whenever the CSV changes.
    Watch(WatchArgs),

    /// Open the desktop viewer.
    View(CsvArgs),

    /// Print the latest per-day rates.
    Summary(SummaryArgs),
}

#[derive(Parser)]
pub struct CsvArgs {
    /// Meter reading CSV.
    pub csv: PathBuf,

    /// Name of the timestamp column.
    #[clap(long = "timestamp-column", default_value = "Date_Time")]
    pub timestamp_column: String,
}

impl CsvArgs {
    pub fn columns(&self) -> MeterColumns {
        MeterColumns {
            timestamp: self.timestamp_column.clone(),
            ..MeterColumns::default()
        }
    }
}

#[derive(Parser)]
pub struct OutputArgs {
    /// Directory for the PNG files, defaults to the CSV's directory.
    #[clap(long = "output-dir", env = "HOME_METRICS_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct RenderArgs {
    #[clap(flatten)]
    pub csv: CsvArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Open the output directory afterwards.
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser)]
pub struct WatchArgs {
    #[clap(flatten)]
    pub csv: CsvArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    #[clap(flatten)]
    pub debounce: DebounceArgs,
}

#[derive(Parser)]
pub struct SummaryArgs {
    #[clap(flatten)]
    pub csv: CsvArgs,

    /// Number of most recent intervals to print.
    #[clap(long, default_value = "7")]
    pub tail: usize,

    /// Print JSON instead of a table.
    #[clap(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_meters_render() {
        let args = Args::try_parse_from([
            "home_metrics",
            "meters",
            "render",
            "readings.csv",
            "--output-dir",
            "out",
            "--open",
            "-v",
        ])
        .unwrap();

        assert!(args.verbose);
        let Command::Meters(MetersArgs { command: MetersCommand::Render(render) }) = args.command else {
            panic!("expected meters render");
        };
        assert_eq!(render.csv.csv, PathBuf::from("readings.csv"));
        assert_eq!(render.output.output_dir, Some(PathBuf::from("out")));
        assert!(render.open);
        assert_eq!(render.csv.columns().timestamp, "Date_Time");
    }

    #[test]
    fn test_parse_occurrences_debounce() {
        let args = Args::try_parse_from(["home_metrics", "occurrences", "log.yaml", "--debounce-secs", "2"])
            .unwrap();
        let Command::Occurrences(occurrences) = args.command else {
            panic!("expected occurrences");
        };
        assert_eq!(occurrences.debounce.window(), Duration::from_secs(2));
    }
}
