//! Meter Viewer Main Application
//! Main window with control panel and chart tabs.

use crate::charts::{ChartData, MeterChart};
use crate::data::MeterLoader;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use tracing::{error, info};

/// CSV loading result from background thread
enum LoadResult {
    Complete {
        charts: Vec<ChartData>,
        n_readings: usize,
    },
    Error(String),
}

/// Main application window.
pub struct MeterViewerApp {
    loader: MeterLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
}

impl MeterViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, loader: MeterLoader, csv_path: Option<PathBuf>) -> Self {
        let mut app = Self {
            loader,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
        };
        if let Some(path) = csv_path {
            app.start_loading(path);
        }
        app
    }

    fn handle_browse_csv(&mut self) {
        if self.control_panel.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.chart_viewer.clear();
            self.start_loading(path);
        }
    }

    fn handle_reload(&mut self) {
        if let Some(path) = self.control_panel.csv_path.clone() {
            self.start_loading(path);
        }
    }

    /// Load the CSV and build every chart in a background thread.
    fn start_loading(&mut self, path: PathBuf) {
        self.control_panel.csv_path = Some(path.clone());
        self.control_panel.set_status("Loading CSV file...");
        self.control_panel.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let loader = self.loader.clone();

        thread::spawn(move || {
            let result = match loader.load_csv(&path) {
                Ok(readings) => {
                    let charts = MeterChart::ALL
                        .par_iter()
                        .map(|kind| kind.build(&readings))
                        .collect();
                    LoadResult::Complete {
                        charts,
                        n_readings: readings.len(),
                    }
                }
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete { charts, n_readings }) => {
                info!(n_readings, "viewer data loaded");
                self.chart_viewer.set_charts(charts);
                self.control_panel.n_readings = n_readings;
                self.control_panel.set_status(&format!("Loaded {n_readings} readings"));
                self.control_panel.is_loading = false;
            }
            Ok(LoadResult::Error(message)) => {
                error!("viewer failed to load data: {message}");
                self.control_panel.set_status(&format!("Error: {message}"));
                self.control_panel.is_loading = false;
            }
            Err(TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.control_panel.set_status("Error: loader stopped unexpectedly");
                self.control_panel.is_loading = false;
            }
        }
    }
}

impl eframe::App for MeterViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.control_panel.is_loading {
            ctx.request_repaint();
        }

        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| match self.control_panel.show(ui) {
                ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                ControlPanelAction::Reload => self.handle_reload(),
                ControlPanelAction::None => {}
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
