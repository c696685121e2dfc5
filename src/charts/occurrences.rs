//! Occurrence Chart Renderer
//! Two stacked panels sharing the date axis:
//! - top: occurrences per day with a centred rolling mean
//! - bottom: every occurrence at its hour of the day, night hours shaded

use super::renderer::{RenderError, StaticChartRenderer};
use super::{day_number, format_day};
use crate::data::{Category, OccurrenceLog};
use crate::stats::StatsCalculator;
use chrono::{Local, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

pub const OCCURRENCE_CHART_SIZE: (u32, u32) = (1200, 800);

const COUNT_COLOR: RGBColor = RGBColor(0, 0, 255);
const ANNOTATION_COLOR: RGBColor = RGBColor(0, 0, 180);
/// Night runs from 22:00 to 08:00.
const NIGHT_START: f64 = 22.0;
const NIGHT_END: f64 = 8.0;
/// Count axis never shrinks below this.
const MIN_COUNT_AXIS: f64 = 20.0;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub struct OccurrenceChartRenderer;

impl OccurrenceChartRenderer {
    /// Render the occurrence chart to the configured output path.
    pub fn render(log: &OccurrenceLog) -> Result<(), RenderError> {
        Self::render_to_file(log, &log.config.output_path)
    }

    pub fn render_to_file(log: &OccurrenceLog, path: &Path) -> Result<(), RenderError> {
        StaticChartRenderer::ensure_parent(path)?;

        let root = BitMapBackend::new(path, OCCURRENCE_CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(&log.config.title, ("sans-serif", 28))?;

        let (x_min, x_max) = Self::date_range(log);
        let areas = root.split_evenly((2, 1));

        Self::draw_counts(&areas[0], log, x_min..x_max)?;
        Self::draw_times(&areas[1], log, x_min..x_max)?;

        root.present()?;
        Ok(())
    }

    /// Date span of the data, one day of padding on each side.
    fn date_range(log: &OccurrenceLog) -> (f64, f64) {
        let dates = log.occurrences.iter().map(|o| o.date);
        let first = dates.clone().min();
        let last = dates.max();
        match (first, last) {
            (Some(first), Some(last)) => (day_number(first) - 1.0, day_number(last) + 1.0),
            _ => {
                let today: NaiveDate = Local::now().date_naive();
                (day_number(today) - 1.0, day_number(today) + 1.0)
            }
        }
    }

    fn draw_counts(
        area: &Area<'_>,
        log: &OccurrenceLog,
        x_range: std::ops::Range<f64>,
    ) -> Result<(), RenderError> {
        let counts = StatsCalculator::occurrences_per_day(&log.occurrences);
        let points: Vec<(f64, f64)> = counts
            .iter()
            .map(|&(date, count)| (day_number(date), count as f64))
            .collect();
        let values: Vec<f64> = points.iter().map(|&(_, y)| y).collect();
        let window = log.config.rolling_window;
        let rolling = StatsCalculator::rolling_mean(&values, window);

        let y_max = values
            .iter()
            .copied()
            .fold(MIN_COUNT_AXIS, |acc, v| acc.max((v * 1.1).ceil()));

        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(20)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, 0.0..y_max)?;

        chart
            .configure_mesh()
            .x_labels(10)
            .x_label_formatter(&|_| String::new())
            .y_desc(log.config.top_axis_label.as_str())
            .y_label_formatter(&|y| format!("{y:.0}"))
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                COUNT_COLOR.mix(0.2).stroke_width(1),
            ))?
            .label("Counts")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COUNT_COLOR.mix(0.2)));
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, 3, COUNT_COLOR.mix(0.2).filled())),
        )?;

        chart
            .draw_series(LineSeries::new(
                points
                    .iter()
                    .zip(rolling.iter())
                    .filter(|(_, mean)| mean.is_finite())
                    .map(|(&(x, _), &mean)| (x, mean)),
                COUNT_COLOR.stroke_width(2),
            ))?
            .label(format!("Rolling mean ({window} days)"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COUNT_COLOR));

        for annotation in &log.config.annotations {
            let x = day_number(annotation.date);
            let label_y = y_max * 0.8;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(x, 0.0), (x, label_y)],
                ANNOTATION_COLOR.stroke_width(1),
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                annotation.label.clone(),
                (x, label_y),
                ("sans-serif", 14).into_font().color(&ANNOTATION_COLOR),
            )))?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    }

    fn draw_times(
        area: &Area<'_>,
        log: &OccurrenceLog,
        x_range: std::ops::Range<f64>,
    ) -> Result<(), RenderError> {
        let (x_min, x_max) = (x_range.start, x_range.end);

        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, 0.0..24.0)?;

        // Night bands first so the markers stay on top
        chart.draw_series([(NIGHT_START, 24.0), (0.0, NIGHT_END)].into_iter().map(
            |(from, to)| Rectangle::new([(x_min, from), (x_max, to)], BLACK.mix(0.15).filled()),
        ))?;

        chart
            .configure_mesh()
            .x_labels(12)
            .x_label_formatter(&|x| format_day(*x))
            .x_desc("Date")
            .y_labels(7)
            .y_label_formatter(&|y| format!("{y:.0}"))
            .y_desc("Time (hour)")
            .draw()?;

        for (category, color, label) in [
            (Category::Normal, BLUE, "Normal"),
            (Category::Red, RED, "Special (r)"),
            (Category::Black, BLACK, "Special (z)"),
        ] {
            let points: Vec<(f64, f64)> = log
                .occurrences
                .iter()
                .filter(|o| o.category == category)
                .map(|o| (day_number(o.date), o.hour_of_day()))
                .collect();
            if points.is_empty() {
                continue;
            }
            chart
                .draw_series(points.into_iter().map(|p| Circle::new(p, 2, color.filled())))?
                .label(label)
                .legend(move |(x, y)| Circle::new((x + 10, y), 3, color.filled()));
        }

        if !log.occurrences.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        Ok(())
    }
}
