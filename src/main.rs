use clap::{crate_version, Parser};
use tracing::info;

use home_metrics::cli::{Args, Command, MetersCommand};
use home_metrics::commands::{meters, occurrences};
use home_metrics::observability::init_tracing;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    info!(version = crate_version!(), "starting…");

    match args.command {
        Command::Occurrences(args) => occurrences::run(&args.yaml, args.debounce.window()),
        Command::Meters(args) => match args.command {
            MetersCommand::Render(args) => meters::run_render(&args),
            MetersCommand::Watch(args) => meters::run_watch(&args),
            MetersCommand::View(args) => meters::run_view(&args),
            MetersCommand::Summary(args) => meters::run_summary(&args),
        },
    }
}
