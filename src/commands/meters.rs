use anyhow::{anyhow, Context};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::charts::{chart_path, MeterChart, RenderError, StaticChartRenderer};
use crate::cli::{CsvArgs, RenderArgs, SummaryArgs, WatchArgs};
use crate::data::{DailyRates, DataProcessor, MeterLoader, Reading};
use crate::gui::MeterViewerApp;
use crate::watch::{install_shutdown_flag, parent_dir, watch_file, RedrawLoop};

fn load(loader: &MeterLoader, csv: &Path) -> anyhow::Result<Vec<Reading>> {
    let readings = loader
        .load_csv(csv)
        .with_context(|| format!("failed to load `{}`", csv.display()))?;
    info!(n_readings = readings.len(), "meter readings loaded");
    Ok(readings)
}

/// Render every [`MeterChart`] into `output_dir`, one file per chart.
pub fn render_all(readings: &[Reading], output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let results: Vec<Result<PathBuf, RenderError>> = MeterChart::ALL
        .par_iter()
        .map(|&chart| {
            let path = chart_path(output_dir, chart);
            StaticChartRenderer::render_to_file(&chart.build(readings), &path)?;
            Ok(path)
        })
        .collect();

    results
        .into_iter()
        .zip(MeterChart::ALL)
        .map(|(result, chart)| result.with_context(|| format!("failed to render {}", chart.file_name())))
        .collect()
}

/// Reload the CSV and rewrite all charts.
pub fn redraw(loader: &MeterLoader, csv: &Path, output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let readings = load(loader, csv)?;
    let paths = render_all(&readings, output_dir)?;
    info!(n_charts = paths.len(), output_dir = %output_dir.display(), "meter charts written");
    Ok(paths)
}

fn resolve_output_dir(csv: &CsvArgs, output_dir: Option<&Path>) -> PathBuf {
    output_dir.map_or_else(|| parent_dir(&csv.csv), Path::to_path_buf)
}

pub fn run_render(args: &RenderArgs) -> anyhow::Result<()> {
    let loader = MeterLoader::new(args.csv.columns());
    let output_dir = resolve_output_dir(&args.csv, args.output.output_dir.as_deref());
    redraw(&loader, &args.csv.csv, &output_dir)?;

    if args.open {
        open::that(&output_dir).with_context(|| format!("failed to open `{}`", output_dir.display()))?;
    }
    Ok(())
}

pub fn run_watch(args: &WatchArgs) -> anyhow::Result<()> {
    let loader = MeterLoader::new(args.csv.columns());
    let csv = &args.csv.csv;
    let output_dir = resolve_output_dir(&args.csv, args.output.output_dir.as_deref());
    let window: Duration = args.debounce.window();

    if let Err(error) = redraw(&loader, csv, &output_dir) {
        error!("initial redraw failed: {error:#}");
    }

    let should_terminate = install_shutdown_flag()?;
    let watch_dir = parent_dir(csv);
    let (watcher, requests) = watch_file(csv, &watch_dir, window)
        .with_context(|| format!("failed to watch `{}`", watch_dir.display()))?;
    info!(
        dir = %watch_dir.display(),
        debounce_secs = window.as_secs_f64(),
        "watching for changes, press Ctrl+C to stop"
    );

    RedrawLoop::new(should_terminate).run(&requests, |_| redraw(&loader, csv, &output_dir).map(|_| ()));
    drop(watcher);
    Ok(())
}

pub fn run_view(args: &CsvArgs) -> anyhow::Result<()> {
    let loader = MeterLoader::new(args.columns());
    let csv = args.csv.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Home Metrics"),
        ..Default::default()
    };

    eframe::run_native(
        "Home Metrics",
        options,
        Box::new(move |cc| Ok(Box::new(MeterViewerApp::new(cc, loader, Some(csv))))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

/// The last `tail` entries of the per-day rates.
pub fn latest_rates(readings: &[Reading], tail: usize) -> Vec<DailyRates> {
    let rates = DataProcessor::daily_rates(readings);
    let skip = rates.len().saturating_sub(tail);
    rates.into_iter().skip(skip).collect()
}

pub fn run_summary(args: &SummaryArgs) -> anyhow::Result<()> {
    let loader = MeterLoader::new(args.csv.columns());
    let readings = load(&loader, &args.csv.csv)?;
    let rates = latest_rates(&readings, args.tail);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rates)?);
        return Ok(());
    }

    println!(
        "{:<16} {:>6} {:>9} {:>9} {:>12} {:>9} {:>10}",
        "until", "days", "water", "gas", "electricity", "solar", "household"
    );
    for rate in &rates {
        println!(
            "{:<16} {:>6.2} {:>9.3} {:>9.3} {:>12.2} {:>9.2} {:>10.2}",
            rate.timestamp.format("%Y-%m-%d %H:%M"),
            rate.interval_days,
            rate.water,
            rate.gas,
            rate.electricity,
            rate.solar,
            rate.household,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_latest_rates_tail() {
        let readings: Vec<Reading> = (1..=5)
            .map(|day| {
                let timestamp = NaiveDate::from_ymd_opt(2024, 3, day).unwrap().and_hms_opt(8, 0, 0).unwrap();
                Reading {
                    water: f64::from(day),
                    ..Reading::empty(timestamp)
                }
            })
            .collect();

        let rates = latest_rates(&readings, 2);
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[1].timestamp.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(latest_rates(&readings, 100).len(), 4);
        assert!(latest_rates(&readings[..1], 3).is_empty());
    }
}
