use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::charts::OccurrenceChartRenderer;
use crate::data::{DisplayConfig, OccurrenceLog};
use crate::watch::{install_shutdown_flag, watch_file, RedrawLoop};

/// Reload the YAML and rewrite the chart.
pub fn redraw(yaml: &Path) -> anyhow::Result<PathBuf> {
    let log = OccurrenceLog::load(yaml).with_context(|| format!("failed to load `{}`", yaml.display()))?;
    render(&log)
}

fn render(log: &OccurrenceLog) -> anyhow::Result<PathBuf> {
    let output = &log.config.output_path;
    OccurrenceChartRenderer::render(log)
        .with_context(|| format!("failed to render `{}`", output.display()))?;
    info!(
        occurrences = log.occurrences.len(),
        output = %output.display(),
        "occurrence chart written"
    );
    Ok(output.clone())
}

/// Draw once, then redraw on every debounced change until interrupted.
pub fn run(yaml: &Path, window: Duration) -> anyhow::Result<()> {
    let config = match OccurrenceLog::load(yaml) {
        Ok(log) => {
            if let Err(error) = render(&log) {
                error!("initial redraw failed: {error:#}");
            }
            log.config
        }
        Err(error) => {
            error!("failed to load `{}`: {error}", yaml.display());
            DisplayConfig::fallback(yaml)
        }
    };

    let should_terminate = install_shutdown_flag()?;
    let (watcher, requests) = watch_file(yaml, &config.watch_dir, window)
        .with_context(|| format!("failed to watch `{}`", config.watch_dir.display()))?;
    info!(
        dir = %config.watch_dir.display(),
        debounce_secs = window.as_secs_f64(),
        "watching for changes, press Ctrl+C to stop"
    );

    RedrawLoop::new(should_terminate).run(&requests, |_| redraw(yaml).map(|_| ()));
    drop(watcher);
    Ok(())
}
