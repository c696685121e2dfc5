//! Chart Plotter Module
//! Draws meter charts interactively using egui_plot.

use super::{format_day, ChartData, Panel, XAxis};
use egui::{Color32, RichText};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

/// Color palette for series
pub const PALETTE: [Color32; 8] = [
    Color32::from_rgb(31, 119, 180),  // Blue
    Color32::from_rgb(255, 127, 14),  // Orange
    Color32::from_rgb(44, 160, 44),   // Green
    Color32::from_rgb(214, 39, 40),   // Red
    Color32::from_rgb(148, 103, 189), // Purple
    Color32::from_rgb(140, 86, 75),   // Brown
    Color32::from_rgb(227, 119, 194), // Pink
    Color32::from_rgb(127, 127, 127), // Grey
];

/// Draws [`ChartData`] with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw every panel of a chart, sharing `total_height`.
    pub fn draw_chart(ui: &mut egui::Ui, chart: &ChartData, total_height: f32) {
        let panel_count = chart.panels.len().max(1) as f32;
        let height = ((total_height - 30.0 * panel_count) / panel_count).max(150.0);

        for (idx, panel) in chart.panels.iter().enumerate() {
            ui.label(RichText::new(&panel.y_label).size(13.0).strong());
            Self::draw_panel(ui, &format!("{:?}_{idx}", chart.kind), panel, height);
        }
    }

    /// Line + markers for every series of one panel.
    pub fn draw_panel(ui: &mut egui::Ui, id: &str, panel: &Panel, height: f32) {
        if panel.is_empty() {
            ui.label(RichText::new("Not enough readings").color(Color32::GRAY));
            return;
        }

        let plot = Plot::new(id)
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false);
        let plot = match panel.x_axis {
            XAxis::Date => plot
                .x_axis_label("Date")
                .x_axis_formatter(|mark, _range| format_day(mark.value)),
            XAxis::DayOfYear => plot.x_axis_label("Day of year"),
        };

        plot.show(ui, |plot_ui| {
            for (idx, series) in panel.series.iter().enumerate() {
                let color = Self::series_color(idx);
                let points: Vec<[f64; 2]> = series.finite_points().map(|(x, y)| [x, y]).collect();

                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(color)
                        .width(1.0)
                        .name(&series.name),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(2.5)
                        .color(color),
                );
            }
        });
    }
}
