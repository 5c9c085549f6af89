//! Chart rendering.
//!
//! The statistical core hands named series and matrices to a [`Renderer`];
//! nothing outside this module depends on a graphics backend. [`SvgRenderer`]
//! draws with plotters, tests substitute a recording renderer.

mod svg;

pub use svg::SvgRenderer;

use crate::error::Result;
use crate::types::{CorrelationMatrix, SalesSummary};
use std::path::{Path, PathBuf};

/// The shape of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Histogram,
    Heatmap,
}

/// Labeled values, one label per value.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// What a chart plots. The variant fixes the chart kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Bar(LabeledSeries),
    Line(LabeledSeries),
    Histogram { values: Vec<f64>, bins: usize },
    Heatmap(CorrelationMatrix),
}

impl ChartData {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartData::Bar(_) => ChartKind::Bar,
            ChartData::Line(_) => ChartKind::Line,
            ChartData::Histogram { .. } => ChartKind::Histogram,
            ChartData::Heatmap(_) => ChartKind::Heatmap,
        }
    }
}

/// A chart ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// File name the chart is written under.
    pub file_name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        self.data.kind()
    }
}

/// Turns a [`ChartSpec`] into an artifact on disk.
pub trait Renderer {
    /// Render `chart` to `destination` and return the written path.
    fn render(&self, chart: &ChartSpec, destination: &Path) -> Result<PathBuf>;
}

/// The five exploratory charts of a sales summary.
pub fn sales_charts(summary: &SalesSummary, bins: usize) -> Vec<ChartSpec> {
    let products = |items: &[crate::types::ProductTotal]| LabeledSeries {
        labels: items.iter().map(|p| p.product_id.clone()).collect(),
        values: items.iter().map(|p| p.total).collect(),
    };

    vec![
        ChartSpec {
            file_name: "top_products_quantity.svg".to_string(),
            title: "Top Products by Quantity".to_string(),
            x_label: "Product ID".to_string(),
            y_label: "Quantity Sold".to_string(),
            data: ChartData::Bar(products(&summary.top_by_quantity)),
        },
        ChartSpec {
            file_name: "top_products_revenue.svg".to_string(),
            title: "Top Products by Revenue".to_string(),
            x_label: "Product ID".to_string(),
            y_label: "Total Sales".to_string(),
            data: ChartData::Bar(products(&summary.top_by_revenue)),
        },
        ChartSpec {
            file_name: "sales_trend.svg".to_string(),
            title: "Sales Trend Over Time".to_string(),
            x_label: "Month".to_string(),
            y_label: "Total Sales".to_string(),
            data: ChartData::Line(LabeledSeries {
                labels: summary.monthly_trend.iter().map(|m| m.label()).collect(),
                values: summary.monthly_trend.iter().map(|m| m.total).collect(),
            }),
        },
        ChartSpec {
            file_name: "distribution_of_sales.svg".to_string(),
            title: "Distribution of Sales Amount".to_string(),
            x_label: "Total Sales".to_string(),
            y_label: "Frequency".to_string(),
            data: ChartData::Histogram {
                values: summary.sales_values.clone(),
                bins,
            },
        },
        ChartSpec {
            file_name: "correlation_heatmap.svg".to_string(),
            title: "Correlation Heatmap".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            data: ChartData::Heatmap(summary.correlation.clone()),
        },
    ]
}

/// One histogram bin: `[start, end)` with its count (the last bin is closed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Split finite values into `bins` equal-width bins over their range.
///
/// A constant column yields a single unit-width bin centered on the value.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![Bin {
            start: min - 0.5,
            end: max + 0.5,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Gaussian kernel density of `values`, evaluated at `points` evenly spaced
/// positions across the bins and scaled to bin counts.
///
/// The bandwidth follows Scott's rule, `sd * n^(-1/5)`. The curve is empty
/// for fewer than two values or a constant column.
pub fn density_curve(values: &[f64], bins: &[Bin], points: usize) -> Vec<(f64, f64)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Vec::new();
    };
    let n = finite.len();
    if n < 2 || points < 2 {
        return Vec::new();
    }

    let mean = finite.iter().sum::<f64>() / n as f64;
    let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    if variance <= 0.0 {
        return Vec::new();
    }
    let bandwidth = variance.sqrt() * (n as f64).powf(-0.2);

    // density * n * bin width, with the 1/n of the estimator cancelled
    let scale = (first.end - first.start) / (bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let span = last.end - first.start;

    (0..points)
        .map(|i| {
            let x = first.start + span * i as f64 / (points - 1) as f64;
            let y: f64 = finite
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum();
            (x, y * scale)
        })
        .collect()
}
