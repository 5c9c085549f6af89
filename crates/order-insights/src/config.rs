//! Configuration types for the order analysis pipeline.
//!
//! Every field has a default that reproduces the fixed file layout of the
//! batch job, so `AnalysisConfig::default()` is a complete configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default input dataset path.
pub const DEFAULT_INPUT_PATH: &str = "orderdataset.csv";

/// Default file name of the cleaned dataset.
pub const DEFAULT_CLEANED_FILE_NAME: &str = "Corrected_File.csv";

/// Configuration for the analysis pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use order_insights::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .input_path("data/orders.csv")
///     .output_dir("reports")
///     .top_n(5)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Path of the source dataset.
    /// Default: "orderdataset.csv"
    pub input_path: PathBuf,

    /// Directory receiving the cleaned dataset, charts and report.
    /// Default: the working directory
    pub output_dir: PathBuf,

    /// File name of the cleaned dataset inside `output_dir`.
    /// Default: "Corrected_File.csv"
    pub cleaned_file_name: String,

    /// Number of products listed in the top-N rankings.
    /// Default: 10
    pub top_n: usize,

    /// Number of bins in the sales distribution histogram.
    /// Default: 50
    pub histogram_bins: usize,

    /// Chart width in pixels.
    /// Default: 1000
    pub chart_width: u32,

    /// Chart height in pixels.
    /// Default: 600
    pub chart_height: u32,

    /// Whether to hand the summary to the renderer.
    /// Default: true
    pub render_charts: bool,

    /// Whether to write `analysis_report.json` next to the cleaned dataset.
    /// Default: false
    pub emit_report: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from("."),
            cleaned_file_name: DEFAULT_CLEANED_FILE_NAME.to_string(),
            top_n: 10,
            histogram_bins: 50,
            chart_width: 1000,
            chart_height: 600,
            render_charts: true,
            emit_report: false,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Full path of the cleaned dataset.
    pub fn cleaned_path(&self) -> PathBuf {
        self.output_dir.join(&self.cleaned_file_name)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_n == 0 {
            return Err(ConfigValidationError::ZeroCount("top_n"));
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::ZeroCount("histogram_bins"));
        }

        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ConfigValidationError::InvalidChartSize {
                width: self.chart_width,
                height: self.chart_height,
            });
        }

        if self.cleaned_file_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyFileName);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{0}': must be at least 1")]
    ZeroCount(&'static str),

    #[error("Invalid chart size {width}x{height}: both dimensions must be non-zero")]
    InvalidChartSize { width: u32, height: u32 },

    #[error("Cleaned file name must not be empty")]
    EmptyFileName,
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    cleaned_file_name: Option<String>,
    top_n: Option<usize>,
    histogram_bins: Option<usize>,
    chart_width: Option<u32>,
    chart_height: Option<u32>,
    render_charts: Option<bool>,
    emit_report: Option<bool>,
}

impl AnalysisConfigBuilder {
    /// Set the path of the source dataset.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the output directory for the cleaned dataset, charts and report.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the file name of the cleaned dataset.
    pub fn cleaned_file_name(mut self, name: impl Into<String>) -> Self {
        self.cleaned_file_name = Some(name.into());
        self
    }

    /// Set how many products the rankings keep.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set the histogram bin count.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the chart size in pixels.
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = Some(width);
        self.chart_height = Some(height);
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Enable or disable the JSON analysis report.
    pub fn emit_report(mut self, emit: bool) -> Self {
        self.emit_report = Some(emit);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            cleaned_file_name: self
                .cleaned_file_name
                .unwrap_or(defaults.cleaned_file_name),
            top_n: self.top_n.unwrap_or(defaults.top_n),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            chart_width: self.chart_width.unwrap_or(defaults.chart_width),
            chart_height: self.chart_height.unwrap_or(defaults.chart_height),
            render_charts: self.render_charts.unwrap_or(defaults.render_charts),
            emit_report: self.emit_report.unwrap_or(defaults.emit_report),
        };

        config.validate()?;
        Ok(config)
    }
}
