//! Chart Viewer Widget
//! One tab per meter chart; the selected chart fills the central panel.

use crate::charts::{ChartData, ChartPlotter, MeterChart};
use egui::{RichText, ScrollArea};

pub struct ChartViewer {
    pub charts: Vec<ChartData>,
    pub selected: MeterChart,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            charts: Vec::new(),
            selected: MeterChart::Water,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.charts.clear();
    }

    /// Replace the charts, keeping the selected tab.
    pub fn set_charts(&mut self, charts: Vec<ChartData>) {
        self.charts = charts;
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            for kind in MeterChart::ALL {
                if ui.selectable_label(self.selected == kind, kind.title()).clicked() {
                    self.selected = kind;
                }
            }
        });
        ui.separator();

        let Some(chart) = self.charts.iter().find(|chart| chart.kind == self.selected) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        let height = ui.available_height() - 40.0;
        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            ui.heading(chart.kind.title());
            ui.add_space(8.0);
            ChartPlotter::draw_chart(ui, chart, height);
        });
    }
}
