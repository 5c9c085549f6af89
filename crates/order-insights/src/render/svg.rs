//! SVG charts drawn with plotters.

use super::{ChartData, ChartSpec, LabeledSeries, Renderer, density_curve, histogram_bins};
use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::CorrelationMatrix;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const LINE_COLOR: RGBColor = RGBColor(214, 39, 40);
const UNDEFINED_CELL: RGBColor = RGBColor(200, 200, 200);

/// Sample positions of the density curve over the histogram.
const DENSITY_POINTS: usize = 200;

/// Renders charts as standalone SVG documents.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    width: u32,
    height: u32,
}

impl SvgRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Draw a chart into an SVG string.
    pub fn render_svg(&self, chart: &ChartSpec) -> Result<String> {
        let mut svg_data = String::new();
        {
            let root =
                SVGBackend::with_string(&mut svg_data, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;

            match &chart.data {
                ChartData::Bar(series) => draw_bars(&root, chart, series)?,
                ChartData::Line(series) => draw_line(&root, chart, series)?,
                ChartData::Histogram { values, bins } => {
                    draw_histogram(&root, chart, values, *bins)?
                }
                ChartData::Heatmap(matrix) => draw_heatmap(&root, chart, matrix)?,
            }

            root.present().map_err(render_err)?;
        }
        Ok(svg_data)
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(1000, 600)
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, chart: &ChartSpec, destination: &Path) -> Result<PathBuf> {
        let svg = self.render_svg(chart)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).context("Creating chart directory")?;
        }
        fs::write(destination, svg)
            .context(format!("Writing chart {}", destination.display()))?;

        debug!("Rendered {:?} chart to {}", chart.kind(), destination.display());
        Ok(destination.to_path_buf())
    }
}

type Area<'a> = DrawingArea<SVGBackend<'a>, plotters::coord::Shift>;

fn render_err(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::RenderFailed(e.to_string())
}

fn upper_bound(values: &[f64]) -> f64 {
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Label of the category whose slot starts at `x`, if `x` sits on one.
fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn draw_bars(root: &Area<'_>, chart: &ChartSpec, series: &LabeledSeries) -> Result<()> {
    let n = series.values.len().max(1);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.1f64..n as f64, 0f64..upper_bound(&series.values))
        .map_err(render_err)?;

    let labels = &series.labels;
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&|x| category_label(labels, *x))
        .x_desc(&chart.x_label)
        .y_desc(&chart.y_label)
        .draw()
        .map_err(render_err)?;

    ctx.draw_series(series.values.iter().enumerate().map(|(i, v)| {
        Rectangle::new([(i as f64, 0.0), (i as f64 + 0.8, *v)], BAR_COLOR.filled())
    }))
    .map_err(render_err)?;

    Ok(())
}

fn draw_line(root: &Area<'_>, chart: &ChartSpec, series: &LabeledSeries) -> Result<()> {
    let n = series.values.len().max(1);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..upper_bound(&series.values))
        .map_err(render_err)?;

    let labels = &series.labels;
    ctx.configure_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| category_label(labels, *x))
        .x_desc(&chart.x_label)
        .y_desc(&chart.y_label)
        .draw()
        .map_err(render_err)?;

    let points: Vec<(f64, f64)> = series
        .values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect();
    ctx.draw_series(LineSeries::new(points.iter().copied(), LINE_COLOR.stroke_width(2)))
        .map_err(render_err)?;
    ctx.draw_series(
        points
            .iter()
            .map(|p| Circle::new(*p, 3, LINE_COLOR.filled())),
    )
    .map_err(render_err)?;

    Ok(())
}

fn draw_histogram(root: &Area<'_>, chart: &ChartSpec, values: &[f64], bins: usize) -> Result<()> {
    let bins = histogram_bins(values, bins);
    let (x_min, x_max) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.start, last.end),
        _ => (0.0, 1.0),
    };
    let density = density_curve(values, &bins, DENSITY_POINTS);
    let heights: Vec<f64> = bins
        .iter()
        .map(|b| b.count as f64)
        .chain(density.iter().map(|(_, y)| *y))
        .collect();

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0f64..upper_bound(&heights))
        .map_err(render_err)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_desc(&chart.x_label)
        .y_desc(&chart.y_label)
        .draw()
        .map_err(render_err)?;

    ctx.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BAR_COLOR.mix(0.8).filled())
    }))
    .map_err(render_err)?;

    if !density.is_empty() {
        ctx.draw_series(LineSeries::new(density, LINE_COLOR.stroke_width(2)))
            .map_err(render_err)?;
    }

    Ok(())
}

fn draw_heatmap(root: &Area<'_>, chart: &ChartSpec, matrix: &CorrelationMatrix) -> Result<()> {
    let k = matrix.len().max(1);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(140)
        .build_cartesian_2d(0f64..k as f64, 0f64..k as f64)
        .map_err(render_err)?;

    // Labels sit on the cell centers; the first row is drawn on top.
    let columns = &matrix.columns;
    let rows: Vec<String> = columns.iter().rev().cloned().collect();
    let x_label = |v: &f64| category_label(columns, *v - 0.5);
    let y_label = |v: &f64| category_label(&rows, *v - 0.5);
    ctx.configure_mesh()
        .disable_mesh()
        .x_labels(2 * k + 1)
        .y_labels(2 * k + 1)
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .draw()
        .map_err(render_err)?;

    let mut cells = Vec::with_capacity(matrix.len() * matrix.len());
    for (i, row) in matrix.values.iter().enumerate() {
        for (j, r) in row.iter().enumerate() {
            cells.push((j as f64, (k - 1 - i) as f64, *r));
        }
    }

    ctx.draw_series(cells.iter().map(|(x, y, r)| {
        Rectangle::new([(*x, *y), (x + 1.0, y + 1.0)], heat_color(*r).filled())
    }))
    .map_err(render_err)?;

    ctx.draw_series(cells.iter().map(|(x, y, r)| {
        let text = if r.is_nan() { "NaN".to_string() } else { format!("{:.2}", r) };
        Text::new(text, (x + 0.4, y + 0.5), ("sans-serif", 14).into_font())
    }))
    .map_err(render_err)?;

    Ok(())
}

/// Diverging blue-white-red scale over [-1, 1]; grey for undefined cells.
fn heat_color(r: f64) -> RGBColor {
    if r.is_nan() {
        return UNDEFINED_CELL;
    }
    let r = r.clamp(-1.0, 1.0);
    let fade = |t: f64| (255.0 * (1.0 - t)).round() as u8;
    if r >= 0.0 {
        RGBColor(255, fade(r), fade(r))
    } else {
        RGBColor(fade(-r), fade(-r), 255)
    }
}
