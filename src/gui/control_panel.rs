//! Control Panel Widget
//! Left side panel: data source, reload and load status.

use egui::{Color32, Grid, RichText};
use std::path::PathBuf;

const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub n_readings: usize,
    pub status: String,
    pub is_loading: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            n_readings: 0,
            status: "Ready".to_string(),
            is_loading: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// File name of the loaded CSV, or a placeholder.
    pub fn source_label(&self) -> String {
        self.csv_path
            .as_deref()
            .and_then(|path| path.file_name())
            .map_or_else(|| "none".to_string(), |name| name.to_string_lossy().into_owned())
    }

    pub fn has_error(&self) -> bool {
        self.status.starts_with("Error")
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.heading("Home Metrics");
        ui.separator();

        Grid::new("data_source")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label("CSV");
                let source = ui.label(RichText::new(self.source_label()).monospace());
                if let Some(path) = &self.csv_path {
                    source.on_hover_text(path.display().to_string());
                }
                ui.end_row();

                ui.label("Readings");
                if self.is_loading {
                    ui.spinner();
                } else {
                    ui.label(self.n_readings.to_string());
                }
                ui.end_row();
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.add_enabled(!self.is_loading, egui::Button::new("Browse…")).clicked() {
                action = ControlPanelAction::BrowseCsv;
            }
            let can_reload = self.csv_path.is_some() && !self.is_loading;
            if ui.add_enabled(can_reload, egui::Button::new("Reload")).clicked() {
                action = ControlPanelAction::Reload;
            }
        });

        ui.separator();
        let status = RichText::new(&self.status).small();
        ui.label(if self.has_error() { status.color(ERROR_COLOR) } else { status.weak() });

        action
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Reload,
}
