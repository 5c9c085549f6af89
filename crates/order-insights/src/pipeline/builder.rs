//! Main analysis pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating load, clean, summarize, render and report.

use crate::cleaner::{CleaningOutcome, DataCleaner};
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::error::{Result, ResultExt};
use crate::loader::Loader;
use crate::render::{Renderer, SvgRenderer, sales_charts};
use crate::reporting::{ReportGenerator, ReportParams};
use crate::summary::Summarizer;
use crate::types::{ColumnKind, SalesSummary, Table};
use polars::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Number of coerced rows kept for the console preview.
const PREVIEW_ROWS: usize = 5;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// (rows, columns) as loaded.
    pub loaded_shape: (usize, usize),
    /// First rows after type coercion, before imputation.
    pub preview: DataFrame,
    /// Name, dtype and kind of each column after type coercion.
    pub coerced_schema: Vec<(String, String, ColumnKind)>,
    /// Cleaning outcome; its table also carries the derived `total_sales`.
    pub cleaning: CleaningOutcome,
    pub summary: SalesSummary,
    pub cleaned_path: PathBuf,
    pub chart_paths: Vec<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub duration_ms: u64,
}

/// The order analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use order_insights::{AnalysisConfig, Pipeline};
///
/// let result = Pipeline::builder()
///     .config(AnalysisConfig::builder().input_path("orders.csv").build()?)
///     .build()?
///     .run()?;
///
/// println!("Total sales: {:.2}", result.summary.total_sales_sum);
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    renderer: Box<dyn Renderer>,
    reporter: ReportGenerator,
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the configured input file and analyze it.
    pub fn run(&self) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let table = Loader::load(&self.config.input_path)
            .context(format!("Loading '{}'", self.config.input_path.display()))
            .inspect_err(|e| error!("Pipeline error: {}", e))?;
        self.run_from(table, start_time)
    }

    /// Analyze an already loaded table.
    pub fn run_on_table(&self, table: Table) -> Result<PipelineResult> {
        self.run_from(table, Instant::now())
    }

    fn run_from(&self, table: Table, start_time: Instant) -> Result<PipelineResult> {
        self.process_internal(table, start_time)
            .inspect_err(|e| error!("Pipeline error: {}", e))
    }

    fn process_internal(&self, table: Table, start_time: Instant) -> Result<PipelineResult> {
        info!("Starting analysis pipeline...");
        let loaded_shape = (table.height(), table.width());

        // Step 1: coerce and impute
        info!("Step 1: Cleaning dataset...");
        let (coerced, parse_failures) = DataCleaner::coerce_types(table)?;
        let preview = coerced.frame().head(Some(PREVIEW_ROWS));
        let coerced_schema = coerced
            .columns()
            .into_iter()
            .map(|(name, kind)| {
                let dtype = coerced
                    .series(&name)
                    .map(|s| s.dtype().to_string())
                    .unwrap_or_default();
                (name, dtype, kind)
            })
            .collect();
        let mut cleaning = DataCleaner::impute(coerced, parse_failures)?;

        // Step 2: persist the cleaned columns, before any derived column exists
        info!("Step 2: Saving cleaned dataset...");
        let cleaned_path =
            DataCleaner::write_cleaned(&cleaning.table, &self.config.cleaned_path())?;

        // Step 3: summarize
        info!("Step 3: Summarizing sales...");
        cleaning.table = Summarizer::with_total_sales(cleaning.table)?;
        let summary = Summarizer::summarize(&cleaning.table, self.config.top_n)?;

        // Step 4: charts
        let chart_paths = if self.config.render_charts {
            info!("Step 4: Rendering charts...");
            self.render_charts(&summary)?
        } else {
            info!("Step 4: Skipping charts (disabled)");
            Vec::new()
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;

        // Step 5: report
        let report_path = if self.config.emit_report {
            info!("Step 5: Writing analysis report...");
            let report = ReportGenerator::build_report(ReportParams {
                input_file: &self.config.input_path,
                cleaned_file: &cleaned_path,
                duration_ms,
                loaded_shape,
                missing_before: &cleaning.missing_before,
                missing_after: &cleaning.missing_after,
                parse_failures: &cleaning.parse_failures,
                processing_steps: &cleaning.processing_steps,
                summary: &summary,
                charts: &chart_paths,
            });
            Some(self.reporter.write_report_to_file(&report)?)
        } else {
            None
        };

        info!("Analysis complete in {}ms", duration_ms);

        Ok(PipelineResult {
            loaded_shape,
            preview,
            coerced_schema,
            cleaning,
            summary,
            cleaned_path,
            chart_paths,
            report_path,
            duration_ms,
        })
    }

    fn render_charts(&self, summary: &SalesSummary) -> Result<Vec<PathBuf>> {
        sales_charts(summary, self.config.histogram_bins)
            .iter()
            .map(|chart| {
                let destination = self.config.output_dir.join(&chart.file_name);
                self.renderer
                    .render(chart, &destination)
                    .context(format!("Rendering '{}'", chart.title))
            })
            .collect()
    }
}

/// Builder for [`Pipeline`].
///
/// Without an explicit renderer the pipeline draws SVG charts sized by the
/// configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    renderer: Option<Box<dyn Renderer>>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the chart renderer.
    pub fn renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let renderer = self.renderer.unwrap_or_else(|| {
            Box::new(SvgRenderer::new(config.chart_width, config.chart_height)) as Box<dyn Renderer>
        });
        let reporter = ReportGenerator::new(config.output_dir.clone());

        Ok(Pipeline {
            config,
            renderer,
            reporter,
        })
    }
}
