//! Static Chart Renderer
//! Writes meter charts to PNG files with plotters.
//!
//! Layout:
//! 1. Title centred at the top
//! 2. One panel per [`Panel`], stacked vertically
//! 3. Each series drawn as a thin line with point markers

use super::{format_day, ChartData, Panel, XAxis};
use crate::stats::StatsCalculator;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Series colours
pub const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(148, 103, 189), // Purple
    RGBColor(140, 86, 75),   // Brown
    RGBColor(227, 119, 194), // Pink
    RGBColor(127, 127, 127), // Grey
];

pub const CHART_SIZE: (u32, u32) = (1280, 960);

/// Y margin as a fraction of the data span.
const Y_MARGIN: f64 = 0.1;
/// X margin as a fraction of the data span.
const X_MARGIN: f64 = 0.05;
/// Date axis padding around a single reading, in days.
const SINGLE_DAY_PAD: f64 = 1.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(error: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(error.to_string())
    }
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Make sure the parent directory of `path` exists.
    pub fn ensure_parent(path: &Path) -> Result<(), RenderError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent).map_err(|source| RenderError::OutputDir {
                    path: parent.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }

    /// Render one meter chart to `path`, overwriting it.
    pub fn render_to_file(data: &ChartData, path: &Path) -> Result<(), RenderError> {
        Self::ensure_parent(path)?;

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(data.kind.title(), ("sans-serif", 32))?;

        let areas = root.split_evenly((data.panels.len().max(1), 1));
        for (panel, area) in data.panels.iter().zip(areas.iter()) {
            Self::draw_panel(area, panel)?;
        }

        root.present()?;
        Ok(())
    }

    fn x_range(panel: &Panel) -> (f64, f64) {
        match panel.x_axis {
            XAxis::DayOfYear => (0.0, 367.0),
            XAxis::Date => StatsCalculator::padded_range_fixed(
                panel
                    .series
                    .iter()
                    .flat_map(|s| s.finite_points().map(|(x, _)| x)),
                X_MARGIN,
                SINGLE_DAY_PAD,
            ),
        }
    }

    fn draw_panel(area: &Area<'_>, panel: &Panel) -> Result<(), RenderError> {
        let (x_min, x_max) = Self::x_range(panel);
        let (y_min, y_max) = StatsCalculator::padded_range(
            panel
                .series
                .iter()
                .flat_map(|s| s.finite_points().map(|(_, y)| y)),
            Y_MARGIN,
        );

        let mut chart = ChartBuilder::on(area)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        let x_desc = match panel.x_axis {
            XAxis::Date => "Date",
            XAxis::DayOfYear => "Day of year",
        };
        let date_axis = panel.x_axis == XAxis::Date;
        let x_formatter = move |x: &f64| {
            if date_axis {
                format_day(*x)
            } else {
                format!("{x:.0}")
            }
        };

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&x_formatter)
            .x_desc(x_desc)
            .y_desc(panel.y_label.as_str())
            .light_line_style(BLACK.mix(0.05))
            .draw()?;

        for (idx, series) in panel.series.iter().enumerate() {
            let color = PALETTE[idx % PALETTE.len()];
            let points: Vec<(f64, f64)> = series.finite_points().collect();

            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(1)))?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

            chart.draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
            )?;
        }

        if panel.series.len() > 1 {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{day_number, NamedSeries};
    use chrono::NaiveDate;

    #[test]
    fn test_single_reading_date_axis_spans_two_days() {
        let day = day_number(NaiveDate::from_ymd_opt(2025, 1, 27).unwrap());
        let panel = Panel {
            y_label: "Gas [m³]".to_string(),
            x_axis: XAxis::Date,
            series: vec![NamedSeries {
                name: "Gas".to_string(),
                points: vec![(day + 0.5, 2000.0)],
            }],
        };

        let (x_min, x_max) = StaticChartRenderer::x_range(&panel);
        assert_eq!(format_day(x_min), "2025-01-26");
        assert_eq!(format_day(x_max), "2025-01-28");
    }

    #[test]
    fn test_day_of_year_axis_is_fixed() {
        let panel = Panel {
            y_label: String::new(),
            x_axis: XAxis::DayOfYear,
            series: Vec::new(),
        };
        assert_eq!(StaticChartRenderer::x_range(&panel), (0.0, 367.0));
    }
}
