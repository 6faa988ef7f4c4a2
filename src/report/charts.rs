//! SVG chart rendering with plotters.
//!
//! Three shapes cover every view in the report: a bar per country, one line
//! per country on shared axes, and one small line panel per country.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{ReportError, Result};
use crate::queries::{Axis, ChartSeries};

pub const WIDTH: u32 = 960;
pub const HEIGHT: u32 = 540;

const PALETTE: [(u8, u8, u8); 10] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
    (188, 189, 34),
    (23, 190, 207),
];

/// Stable country → color assignment so a country keeps its color across
/// every chart of a report.
#[derive(Debug, Clone, Default)]
pub struct CountryColors {
    index: HashMap<String, usize>,
}

impl CountryColors {
    pub fn new<S: AsRef<str>>(countries: &[S]) -> Self {
        let index = countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_ref().to_string(), i))
            .collect();
        Self { index }
    }

    pub fn color(&self, country: &str) -> RGBColor {
        let i = self.index.get(country).copied().unwrap_or(0);
        let (r, g, b) = PALETTE[i % PALETTE.len()];
        RGBColor(r, g, b)
    }
}

/// Render one bar per `(country, value)` pair, in the given order.
pub fn bar_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    values: &[(String, f64)],
    colors: &CountryColors,
) -> Result<()> {
    if values.is_empty() {
        return Err(ReportError::Chart(format!("No data for chart '{}'", title)));
    }
    let (y_min, y_max) = padded_bounds(values.iter().map(|(_, v)| *v));
    let n = values.len();

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24.0))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)?;

    let label = |x: &f64| {
        let i = x.round();
        if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < n {
            values[i as usize].0.clone()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&label)
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, (country, v))| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.35, 0.0f64.max(y_min)), (x + 0.35, *v)],
            colors.color(country).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Render every series as a line on one shared set of axes, with a legend.
pub fn line_chart(
    path: &Path,
    title: &str,
    axis: Axis,
    y_desc: &str,
    series: &[ChartSeries],
    colors: &CountryColors,
) -> Result<()> {
    if series.is_empty() {
        return Err(ReportError::Chart(format!("No data for chart '{}'", title)));
    }
    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    draw_lines(&root, title, 24.0, axis, y_desc, series, colors, true)?;
    root.present()?;
    Ok(())
}

/// Render one small panel per series, sharing axis bounds.
pub fn faceted_line_chart(
    path: &Path,
    title: &str,
    axis: Axis,
    y_desc: &str,
    series: &[ChartSeries],
    colors: &CountryColors,
) -> Result<()> {
    if series.is_empty() {
        return Err(ReportError::Chart(format!("No data for chart '{}'", title)));
    }
    let cols = series.len().min(3);
    let rows = series.len().div_ceil(cols);

    let root = SVGBackend::new(path, (WIDTH, 260 * rows as u32 + 40)).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(title, ("sans-serif", 24.0))?;
    let panels = body.split_evenly((rows, cols));

    let bounds = Bounds::of(series);
    for (panel, s) in panels.iter().zip(series) {
        draw_lines_within(
            panel,
            &s.country,
            16.0,
            axis,
            y_desc,
            std::slice::from_ref(s),
            colors,
            false,
            &bounds,
        )?;
    }

    root.present()?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_lines(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    title_size: f64,
    axis: Axis,
    y_desc: &str,
    series: &[ChartSeries],
    colors: &CountryColors,
    legend: bool,
) -> Result<()> {
    let bounds = Bounds::of(series);
    draw_lines_within(area, title, title_size, axis, y_desc, series, colors, legend, &bounds)
}

#[allow(clippy::too_many_arguments)]
fn draw_lines_within(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    title_size: f64,
    axis: Axis,
    y_desc: &str,
    series: &[ChartSeries],
    colors: &CountryColors,
    legend: bool,
    bounds: &Bounds,
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", title_size))
        .margin(10)
        .x_label_area_size(36)
        .y_label_area_size(64)
        .build_cartesian_2d(bounds.x_min..bounds.x_max, bounds.y_min..bounds.y_max)?;

    let x_fmt = |x: &i64| format_x(axis, *x);
    chart
        .configure_mesh()
        .x_labels(6)
        .x_label_formatter(&x_fmt)
        .x_desc(axis.label())
        .y_desc(y_desc)
        .draw()?;

    for s in series {
        let color = colors.color(&s.country);
        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))?
            .label(s.country.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if legend {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }
    Ok(())
}

struct Bounds {
    x_min: i64,
    x_max: i64,
    y_min: f64,
    y_max: f64,
}

impl Bounds {
    fn of(series: &[ChartSeries]) -> Self {
        let points = series.iter().flat_map(|s| s.points.iter());
        let (x_min, x_max) = points
            .clone()
            .fold((i64::MAX, i64::MIN), |(lo, hi), (x, _)| (lo.min(*x), hi.max(*x)));
        let (y_min, y_max) = padded_bounds(points.map(|(_, y)| *y));
        let (x_min, x_max) = if x_min > x_max { (0, 1) } else { (x_min, x_max.max(x_min + 1)) };
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
}

/// Value range that always includes zero, padded 5% above the top.
fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = (hi - lo).max(1.0);
    (lo - if lo < 0.0 { span * 0.05 } else { 0.0 }, hi + span * 0.05)
}

fn format_x(axis: Axis, x: i64) -> String {
    match axis {
        Axis::Date => i32::try_from(x)
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        _ => x.to_string(),
    }
}
