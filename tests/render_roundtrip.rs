use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use home_metrics::charts::MeterChart;
use home_metrics::commands::{meters, occurrences};
use home_metrics::data::MeterLoader;
use home_metrics::watch::{watch_file, RedrawLoop};

const METER_CSV: &str = "\
Date_Time,Water,Gas,eDag,eNacht,SMA_3000,SMA_7000
# meter swap below
2024-12-30 08:00,100.0,2000.0,5000.0,4000.0,300.0,700.0
2024-12-31 08:00,100.4,2003.1,5006.0,4004.0,301.0,702.3
2025-01-02 08:00,101.2,2009.5,5017.0,4012.5,303.1,707.0
2025-01-03 20:00,101.9,2013.0,5026.0,4018.0,304.0,709.1
";

fn assert_png(path: &Path, size: (u32, u32)) {
    let metadata = fs::metadata(path).unwrap();
    assert!(metadata.len() > 0, "{} is empty", path.display());
    let image = image::open(path).unwrap();
    assert_eq!((image.width(), image.height()), size);
}

#[test]
fn occurrence_chart_is_written_on_redraw() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = dir.path().join("coffee.yaml");
    fs::write(
        &yaml,
        "title: Coffee\npng_file: coffee.png\ndata:\n  2025-01-27: ['07:30', '12:15r']\n  2025-01-28: ['23:05z']\n",
    )
    .unwrap();

    let path = occurrences::redraw(&yaml).unwrap();
    assert_eq!(path, dir.path().join("coffee.png"));
    assert_png(&path, (1200, 800));
}

#[test]
fn malformed_yaml_is_reported_not_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = dir.path().join("broken.yaml");
    fs::write(&yaml, "data: [unclosed\n").unwrap();

    let error = occurrences::redraw(&yaml).unwrap_err();
    assert!(format!("{error:#}").contains("broken.yaml"));
    assert!(!dir.path().join("occurrences.png").exists());
}

#[test]
fn every_meter_chart_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("meterstanden.csv");
    fs::write(&csv, METER_CSV).unwrap();

    let readings = MeterLoader::default().load_csv(&csv).unwrap();
    assert_eq!(readings.len(), 4);

    let output_dir = dir.path().join("charts");
    let paths = meters::render_all(&readings, &output_dir).unwrap();
    assert_eq!(paths.len(), MeterChart::ALL.len());
    for path in &paths {
        assert_png(path, (1280, 960));
    }
}

#[test]
fn summary_rates_follow_the_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("meterstanden.csv");
    fs::write(&csv, METER_CSV).unwrap();

    let readings = MeterLoader::default().load_csv(&csv).unwrap();
    let rates = meters::latest_rates(&readings, 1);

    assert_eq!(rates.len(), 1);
    approx::assert_relative_eq!(rates[0].interval_days, 1.5);
    approx::assert_relative_eq!(rates[0].gas, 3.5 / 1.5, epsilon = 1e-9);
}

#[test]
fn unwritable_output_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, "").unwrap();
    let yaml = dir.path().join("log.yaml");
    fs::write(
        &yaml,
        format!("png_path: {}\ndata:\n  2025-01-27: ['07:30']\n", blocker.join("out").display()),
    )
    .unwrap();

    let error = occurrences::redraw(&yaml).unwrap_err();
    assert!(format!("{error:#}").contains("failed to render"));
}

#[test]
fn watched_change_redraws_the_occurrence_chart() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = dir.path().join("log.yaml");
    let png = dir.path().join("occurrences.png");
    fs::write(&yaml, "data:\n  2025-01-27: ['07:30']\n").unwrap();

    occurrences::redraw(&yaml).unwrap();
    fs::remove_file(&png).unwrap();

    let (watcher, requests) = watch_file(&yaml, dir.path(), Duration::from_secs(5)).unwrap();
    fs::write(&yaml, "data:\n  2025-01-27: ['07:30', '12:15r']\n  2025-01-28: ['23:05z']\n").unwrap();

    let shutdown = Arc::new(AtomicBool::new(false));
    let timeout = Arc::clone(&shutdown);
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(20));
        timeout.store(true, Ordering::Relaxed);
    });

    let flag = Arc::clone(&shutdown);
    let stats = RedrawLoop::new(shutdown)
        .with_poll_interval(Duration::from_millis(100))
        .run(&requests, |_| {
            let result = occurrences::redraw(&yaml).map(|_| ());
            flag.store(true, Ordering::Relaxed);
            result
        });
    drop(watcher);

    assert_eq!(stats.completed, 1);
    assert_eq!(stats.failed, 0);
    assert_png(&png, (1200, 800));
}
