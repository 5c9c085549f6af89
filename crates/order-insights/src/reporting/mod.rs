//! Report generation module.
//!
//! Builds the optional JSON record of a run (`--emit-report`):
//!
//! ```rust,ignore
//! use order_insights::reporting::ReportGenerator;
//!
//! let generator = ReportGenerator::new("output");
//! let path = generator.write_report_to_file(&report)?;
//! ```

mod generator;

pub use generator::{AnalysisReport, REPORT_FILE_NAME, ReportGenerator, ReportParams};
