//! Integration tests for the order analysis pipeline.
//!
//! These tests run the pipeline end to end on small fixture datasets, with a
//! recording renderer standing in for the chart backend.

use order_insights::utils::{f64_values, millis_values, string_values};
use order_insights::{
    AnalysisConfig, AnalysisResult, ChartKind, ChartSpec, DataCleaner, Loader, Pipeline,
    PipelineResult, Renderer, Summarizer,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[derive(Clone, Default)]
struct RecordingRenderer {
    charts: Arc<Mutex<Vec<(ChartKind, PathBuf)>>>,
}

impl Renderer for RecordingRenderer {
    fn render(&self, chart: &ChartSpec, destination: &Path) -> AnalysisResult<PathBuf> {
        self.charts
            .lock()
            .unwrap()
            .push((chart.kind(), destination.to_path_buf()));
        Ok(destination.to_path_buf())
    }
}

fn run_fixture(
    filename: &str,
    output_dir: &Path,
    renderer: RecordingRenderer,
) -> AnalysisResult<PipelineResult> {
    let config = AnalysisConfig::builder()
        .input_path(fixtures_path().join(filename))
        .output_dir(output_dir)
        .build()
        .unwrap();

    Pipeline::builder()
        .config(config)
        .renderer(Box::new(renderer))
        .build()
        .unwrap()
        .run()
}

const MS_PER_MINUTE: i64 = 60_000;

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_packed_dataset_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();

    let result = run_fixture("orders_packed.csv", dir.path(), renderer.clone()).unwrap();

    assert_eq!(result.loaded_shape, (5, 12));
    assert_eq!(result.cleaning.missing_before.get("purchase_date"), Some(1));
    assert_eq!(result.cleaning.missing_before.get("product_weight_gram"), Some(1));
    assert_eq!(result.cleaning.missing_before.total(), 2);
    assert_eq!(result.cleaning.missing_after.total(), 0);

    let summary = &result.summary;
    assert_eq!(summary.row_count, 5);
    assert_eq!(summary.total_sales_sum, 200.0 + 50.0 + 300.0 + 20.0 + 200.0);
    assert_eq!(summary.total_sales_mean, 154.0);

    // p1 and p2 both sold 5 units; the tie resolves by product id.
    let by_quantity: Vec<(&str, f64)> = summary
        .top_by_quantity
        .iter()
        .map(|p| (p.product_id.as_str(), p.total))
        .collect();
    assert_eq!(by_quantity, vec![("p1", 5.0), ("p2", 5.0), ("p3", 1.0)]);

    let by_revenue: Vec<&str> = summary
        .top_by_revenue
        .iter()
        .map(|p| p.product_id.as_str())
        .collect();
    assert_eq!(by_revenue, vec!["p1", "p2", "p3"]);

    // The missing date takes the midpoint of 2018-02-10 14:30 and 2018-02-20 09:15.
    let trend: Vec<(String, f64)> = summary
        .monthly_trend
        .iter()
        .map(|m| (m.label(), m.total))
        .collect();
    assert_eq!(
        trend,
        vec![
            ("2018-01".to_string(), 200.0),
            ("2018-02".to_string(), 370.0),
            ("2018-03".to_string(), 200.0),
        ]
    );

    let table = &result.cleaning.table;
    let weights = f64_values(table.series("product_weight_gram").unwrap()).unwrap();
    assert_eq!(weights[3], Some(425.0));

    let charts = renderer.charts.lock().unwrap();
    assert_eq!(charts.len(), 5);
    assert!(charts.iter().all(|(_, path)| path.starts_with(dir.path())));
    assert_eq!(result.chart_paths.len(), 5);
}

#[test]
fn test_cleaned_file_keeps_original_columns() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_fixture("orders_packed.csv", dir.path(), RecordingRenderer::default()).unwrap();

    assert_eq!(result.cleaned_path, dir.path().join("Corrected_File.csv"));
    let content = fs::read_to_string(&result.cleaned_path).unwrap();
    let header = content.lines().next().unwrap();
    assert_eq!(
        header,
        "order_id,quantity,product_id,price,seller_id,freight_value,customer_id,\
         order_status,purchase_date,payment_type,product_category_name,product_weight_gram"
    );
    assert_eq!(content.lines().count(), 6);
    assert!(!header.contains("total_sales"));
}

#[test]
fn test_cleaning_is_idempotent_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_fixture("orders_packed.csv", dir.path(), RecordingRenderer::default()).unwrap();

    let reloaded = Loader::load(&result.cleaned_path).unwrap();
    let again = DataCleaner::clean(reloaded).unwrap();

    assert_eq!(again.missing_before.total(), 0);
    assert!(again.processing_steps.is_empty());

    let first = &result.cleaning.table;
    let second = &again.table;
    for column in ["quantity", "price", "freight_value", "product_weight_gram"] {
        assert_eq!(
            f64_values(first.series(column).unwrap()).unwrap(),
            f64_values(second.series(column).unwrap()).unwrap(),
            "column {column}"
        );
    }
    assert_eq!(
        millis_values(first.series("purchase_date").unwrap()).unwrap(),
        millis_values(second.series("purchase_date").unwrap()).unwrap()
    );
    assert_eq!(
        string_values(first.series("payment_type").unwrap()).unwrap(),
        string_values(second.series("payment_type").unwrap()).unwrap()
    );
}

#[test]
fn test_multi_column_dataset_with_messy_values() {
    let dir = tempfile::tempdir().unwrap();
    let result =
        run_fixture("orders_columns.csv", dir.path(), RecordingRenderer::default()).unwrap();

    assert_eq!(result.loaded_shape, (4, 8));
    // "$1,200.00" keeps its grouping comma and does not parse.
    assert_eq!(
        result.cleaning.parse_failures,
        vec![
            ("quantity".to_string(), 1),
            ("price".to_string(), 1),
            ("purchase_date".to_string(), 1)
        ]
    );
    assert_eq!(result.cleaning.missing_after.total(), 0);

    let table = &result.cleaning.table;
    assert_eq!(
        f64_values(table.series("quantity").unwrap()).unwrap(),
        vec![Some(2.0), Some(1.0), Some(1.0), Some(1.0)]
    );
    assert_eq!(
        string_values(table.series("payment_type").unwrap()).unwrap()[3],
        Some("credit_card".to_string())
    );

    // The unparseable date takes the median instant, 2018-01-15 08:00.
    let dates = millis_values(table.series("purchase_date").unwrap()).unwrap();
    assert_eq!(dates[3], dates[1]);
    assert_eq!(dates[1].map(|ms| ms % (24 * 60 * MS_PER_MINUTE)), Some(8 * 60 * MS_PER_MINUTE));

    // The price takes the median of 100, 100 and 20.
    assert_eq!(
        f64_values(table.series("price").unwrap()).unwrap()[1],
        Some(100.0)
    );

    let summary = &result.summary;
    assert_eq!(summary.total_sales_sum, 200.0 + 100.0 + 100.0 + 20.0);
    assert_eq!(summary.top_by_revenue[0].product_id, "p1");
    assert_eq!(summary.top_by_revenue[0].total, 300.0);
    assert_eq!(
        summary.correlation.columns,
        vec!["quantity", "price", "freight_value", "product_weight_gram", "total_sales"]
    );
}

#[test]
fn test_ragged_records_are_padded_and_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_fixture("orders_ragged.csv", dir.path(), RecordingRenderer::default()).unwrap();

    assert_eq!(result.loaded_shape, (3, 12));
    assert_eq!(result.cleaning.missing_before.get("purchase_date"), Some(1));
    assert_eq!(result.cleaning.missing_before.get("seller_id"), Some(1));
    assert_eq!(result.cleaning.missing_after.total(), 0);
    assert_eq!(result.summary.total_sales_sum, 50.0);

    let weights = f64_values(result.cleaning.table.series("product_weight_gram").unwrap()).unwrap();
    assert_eq!(weights, vec![Some(275.0), Some(250.0), Some(300.0)]);
}

#[test]
fn test_packed_records_with_commas_and_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_fixture(
        "orders_packed_punctuation.csv",
        dir.path(),
        RecordingRenderer::default(),
    )
    .unwrap();

    assert_eq!(result.loaded_shape, (3, 12));
    assert_eq!(result.cleaning.parse_failures, vec![("price".to_string(), 1)]);

    // The decimal comma is rejected and imputed, never read as 105.
    let table = &result.cleaning.table;
    assert_eq!(
        f64_values(table.series("price").unwrap()).unwrap(),
        vec![Some(15.0), Some(20.0), Some(10.0)]
    );
    assert_eq!(
        string_values(table.series("product_category_name").unwrap()).unwrap()[0],
        Some("\"toys, games\"".to_string())
    );
    assert_eq!(
        string_values(table.series("order_status").unwrap()).unwrap()[2],
        Some("\"shipped".to_string())
    );
    assert_eq!(result.summary.total_sales_sum, 30.0 + 20.0 + 30.0);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_all_missing_column_is_undefined() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();

    let err = run_fixture("orders_all_missing_weight.csv", dir.path(), renderer.clone())
        .unwrap_err();

    assert!(err.is_compute_undefined());
    assert!(err.to_string().contains("product_weight_gram"));
    assert!(renderer.charts.lock().unwrap().is_empty());
    assert!(!dir.path().join("Corrected_File.csv").exists());
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_fixture("does_not_exist.csv", dir.path(), RecordingRenderer::default())
        .unwrap_err();
    assert!(err.is_io());
    assert_eq!(err.error_code(), "IO_ERROR");
}

// ============================================================================
// Stages used directly
// ============================================================================

#[test]
fn test_stages_without_pipeline() {
    let table = Loader::load(fixtures_path().join("orders_packed.csv")).unwrap();
    let outcome = DataCleaner::clean(table).unwrap();
    let table = Summarizer::with_total_sales(outcome.table).unwrap();
    let summary = Summarizer::summarize(&table, 2).unwrap();

    assert_eq!(summary.top_by_quantity.len(), 2);
    assert_eq!(summary.total_sales_sum, 770.0);
    for column in &summary.correlation.columns {
        assert_eq!(summary.correlation.get(column, column), Some(1.0));
    }
}

#[test]
fn test_report_is_written_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig::builder()
        .input_path(fixtures_path().join("orders_packed.csv"))
        .output_dir(dir.path())
        .render_charts(false)
        .emit_report(true)
        .build()
        .unwrap();

    let result = Pipeline::builder()
        .config(config)
        .renderer(Box::new(RecordingRenderer::default()))
        .build()
        .unwrap()
        .run()
        .unwrap();

    let report_path = result.report_path.unwrap();
    assert_eq!(report_path, dir.path().join("analysis_report.json"));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(json["summary"]["total_sales_sum"], 770.0);
    assert_eq!(json["loaded_shape"][0], 5);
    assert_eq!(json["processing_steps"].as_array().map(Vec::len), Some(2));
}
