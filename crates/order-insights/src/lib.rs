//! Order Dataset Analysis Library
//!
//! Cleans, summarizes and charts order datasets built with Rust and Polars.
//!
//! # Overview
//!
//! A run moves one [`Table`] through four stages:
//!
//! - **Loading**: CSV input read as text; a single packed column is split on `;`
//! - **Cleaning**: per-kind type coercion, then median/mode imputation until no
//!   cell is missing; the cleaned table is written to CSV
//! - **Summarizing**: `total_sales`, top products, Pearson correlations and the
//!   monthly sales trend
//! - **Rendering**: charts drawn through the [`Renderer`] trait
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use order_insights::{AnalysisConfig, Pipeline};
//!
//! let config = AnalysisConfig::builder()
//!     .input_path("orderdataset.csv")
//!     .output_dir("reports")
//!     .emit_report(true)
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.run()?;
//!
//! println!("Total sales: {:.2}", result.summary.total_sales_sum);
//! for product in &result.summary.top_by_revenue {
//!     println!("{} {:.2}", product.product_id, product.total);
//! }
//! ```
//!
//! # Stages on their own
//!
//! ```rust,ignore
//! use order_insights::{DataCleaner, Loader, Summarizer};
//!
//! let outcome = DataCleaner::clean(Loader::load("orders.csv")?)?;
//! let table = Summarizer::with_total_sales(outcome.table)?;
//! let summary = Summarizer::summarize(&table, 10)?;
//! ```
//!
//! # Failures
//!
//! Unparseable cells and malformed records become missing values. A column
//! whose gaps cannot be filled because it has no valid value at all fails the
//! run with [`AnalysisError::ComputeUndefined`].

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod render;
pub mod reporting;
pub mod summary;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{CLEANED_DATETIME_FORMAT, CleaningOutcome, DataCleaner};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use loader::Loader;
pub use pipeline::{Pipeline, PipelineBuilder, PipelineResult};
pub use render::{
    ChartData, ChartKind, ChartSpec, LabeledSeries, Renderer, SvgRenderer, sales_charts,
};
pub use reporting::{AnalysisReport, ReportGenerator, ReportParams};
pub use summary::Summarizer;
pub use types::{
    ColumnKind, CorrelationMatrix, MissingCounts, MonthlyTotal, ProductTotal, SalesSummary, Table,
};
