use crate::error::{Result, ResultExt};
use crate::types::{MissingCounts, SalesSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the JSON report inside the output directory.
pub const REPORT_FILE_NAME: &str = "analysis_report.json";

// ============================================================================
// Report Types
// ============================================================================

/// Machine-readable record of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    // Metadata
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the cleaned CSV
    pub cleaned_file: String,
    /// Total execution time in milliseconds
    pub duration_ms: u64,

    // Shape
    /// (rows, columns) as loaded
    pub loaded_shape: (usize, usize),

    // Cleaning
    pub missing_before: MissingCounts,
    pub missing_after: MissingCounts,
    /// Unparseable values per column that were turned into missing cells
    pub parse_failures: Vec<(String, usize)>,
    /// List of processing steps executed
    pub processing_steps: Vec<String>,

    // Results
    pub summary: SalesSummary,
    /// Chart files written during the run
    pub charts: Vec<String>,
}

/// Parameters for building an analysis report.
pub struct ReportParams<'a> {
    pub input_file: &'a Path,
    pub cleaned_file: &'a Path,
    pub duration_ms: u64,
    pub loaded_shape: (usize, usize),
    pub missing_before: &'a MissingCounts,
    pub missing_after: &'a MissingCounts,
    pub parse_failures: &'a [(String, usize)],
    pub processing_steps: &'a [String],
    pub summary: &'a SalesSummary,
    pub charts: &'a [PathBuf],
}

pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Assemble a report from the pieces of a finished run.
    pub fn build_report(params: ReportParams<'_>) -> AnalysisReport {
        let ReportParams {
            input_file,
            cleaned_file,
            duration_ms,
            loaded_shape,
            missing_before,
            missing_after,
            parse_failures,
            processing_steps,
            summary,
            charts,
        } = params;

        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.display().to_string(),
            cleaned_file: cleaned_file.display().to_string(),
            duration_ms,
            loaded_shape,
            missing_before: missing_before.clone(),
            missing_after: missing_after.clone(),
            parse_failures: parse_failures.to_vec(),
            processing_steps: processing_steps.to_vec(),
            summary: summary.clone(),
            charts: charts.iter().map(|p| p.display().to_string()).collect(),
        }
    }

    /// Write a report as pretty-printed JSON into the output directory.
    pub fn write_report_to_file(&self, report: &AnalysisReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).context("Creating output directory")?;

        let report_path = self.output_dir.join(REPORT_FILE_NAME);
        let mut file =
            File::create(&report_path).context(format!("Creating {}", report_path.display()))?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())
            .context(format!("Writing {}", report_path.display()))?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CorrelationMatrix, ProductTotal};

    fn summary() -> SalesSummary {
        SalesSummary {
            row_count: 2,
            total_sales_sum: 30.0,
            total_sales_mean: 15.0,
            top_by_quantity: vec![ProductTotal {
                product_id: "p1".to_string(),
                total: 2.0,
            }],
            top_by_revenue: vec![],
            correlation: CorrelationMatrix {
                columns: vec!["quantity".to_string(), "price".to_string()],
                values: vec![vec![1.0, f64::NAN], vec![f64::NAN, f64::NAN]],
            },
            monthly_trend: vec![],
            sales_values: vec![10.0, 20.0],
        }
    }

    fn report() -> AnalysisReport {
        let missing = MissingCounts {
            columns: vec![("price".to_string(), 1)],
        };
        let summary = summary();
        let steps = vec!["Filled 'price' with median: 10.00".to_string()];
        let charts = vec![PathBuf::from("out/sales_trend.svg")];
        ReportGenerator::build_report(ReportParams {
            input_file: Path::new("orders.csv"),
            cleaned_file: Path::new("out/Corrected_File.csv"),
            duration_ms: 12,
            loaded_shape: (2, 12),
            missing_before: &missing,
            missing_after: &MissingCounts { columns: vec![] },
            parse_failures: &[],
            processing_steps: &steps,
            summary: &summary,
            charts: &charts,
        })
    }

    #[test]
    fn test_build_report() {
        let report = report();
        assert_eq!(report.input_file, "orders.csv");
        assert_eq!(report.missing_before.total(), 1);
        assert_eq!(report.charts, vec!["out/sales_trend.svg".to_string()]);
        assert_eq!(report.summary.total_sales_sum, 30.0);
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(dir.path().join("nested"));

        let path = generator.write_report_to_file(&report()).unwrap();
        assert_eq!(path, dir.path().join("nested").join(REPORT_FILE_NAME));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["summary"]["total_sales_sum"], 30.0);
        assert_eq!(json["processing_steps"][0], "Filled 'price' with median: 10.00");
        // Undefined correlations serialize as null.
        assert!(json["summary"]["correlation"]["values"][0][1].is_null());
        assert!(json["summary"].get("sales_values").is_none());
    }
}
