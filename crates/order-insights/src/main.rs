//! CLI entry point for the order dataset analysis.

use anyhow::Result;
use clap::Parser;
use order_insights::{
    AnalysisConfig, CorrelationMatrix, MissingCounts, Pipeline, PipelineResult, ProductTotal,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Order dataset cleaning and sales analysis",
    long_about = "Cleans an order dataset, imputes missing values, and summarizes sales.\n\n\
                  Running without flags reads ./orderdataset.csv and writes the cleaned\n\
                  dataset and charts to the working directory.\n\n\
                  EXAMPLES:\n  \
                  # Default paths\n  \
                  order-insights\n\n  \
                  # Custom input and output, with a JSON report\n  \
                  order-insights -i data/orders.csv -o reports --emit-report\n\n  \
                  # Numbers only, no charts\n  \
                  order-insights --no-charts --top-n 5"
)]
struct Args {
    /// Path to the order dataset (CSV, or one `;`-packed column)
    #[arg(short, long, default_value = "orderdataset.csv")]
    input: String,

    /// Output directory for the cleaned dataset, charts and report
    #[arg(short, long, default_value = ".")]
    output: String,

    /// File name of the cleaned dataset inside the output directory
    #[arg(long, default_value = "Corrected_File.csv")]
    cleaned_name: String,

    /// Number of products in the top-N rankings
    #[arg(long, default_value = "10")]
    top_n: usize,

    /// Number of bins in the sales distribution histogram
    #[arg(long, default_value = "50")]
    bins: usize,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Write analysis_report.json to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final summary)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    let config = AnalysisConfig::builder()
        .input_path(&args.input)
        .output_dir(&args.output)
        .cleaned_file_name(&args.cleaned_name)
        .top_n(args.top_n)
        .histogram_bins(args.bins)
        .render_charts(!args.no_charts)
        .emit_report(args.emit_report)
        .build()?;

    let result = Pipeline::builder().config(config).build()?.run()?;
    info!("Finished in {}ms", result.duration_ms);

    print_human_readable_summary(&result);
    Ok(())
}

/// Print the analysis results.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn print_human_readable_summary(result: &PipelineResult) {
    let summary = &result.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("ORDER DATASET ANALYSIS");
    println!("{}", "=".repeat(80));
    println!();

    println!("DATASET PREVIEW");
    println!("{}", "-".repeat(40));
    println!(
        "  {} rows x {} columns as loaded; first rows after type coercion:",
        result.loaded_shape.0, result.loaded_shape.1
    );
    println!("{}", result.preview);
    println!();

    println!("SCHEMA (before imputation)");
    println!("{}", "-".repeat(40));
    let rows = result.loaded_shape.0;
    println!(
        "  {:<25} {:>14} {:<20} {}",
        "Column", "Non-Null", "Dtype", "Kind"
    );
    for (name, dtype, kind) in &result.coerced_schema {
        let missing = result.cleaning.missing_before.get(name).unwrap_or(0);
        println!(
            "  {:<25} {:>14} {:<20} {}",
            truncate_str(name, 25),
            format!("{} non-null", rows.saturating_sub(missing)),
            dtype,
            kind.as_str()
        );
    }
    println!();

    println!("MISSING VALUES");
    println!("{}", "-".repeat(40));
    print_missing(&result.cleaning.missing_before, &result.cleaning.missing_after);
    println!();

    if !result.cleaning.processing_steps.is_empty() {
        println!("ACTIONS TAKEN");
        println!("{}", "-".repeat(40));
        for step in &result.cleaning.processing_steps {
            println!("  - {}", step);
        }
        println!();
    }

    println!("SALES");
    println!("{}", "-".repeat(40));
    println!("  Orders:              {}", summary.row_count);
    println!("  Total sales:         {:.2}", summary.total_sales_sum);
    println!("  Average order sales: {:.2}", summary.total_sales_mean);
    println!();

    print_ranking("TOP PRODUCTS BY QUANTITY", "Quantity", &summary.top_by_quantity);
    print_ranking("TOP PRODUCTS BY REVENUE", "Total Sales", &summary.top_by_revenue);

    println!("MONTHLY SALES");
    println!("{}", "-".repeat(40));
    for month in &summary.monthly_trend {
        println!("  {}  {:>14.2}", month.label(), month.total);
    }
    println!();

    println!("CORRELATION MATRIX");
    println!("{}", "-".repeat(40));
    print_correlation(&summary.correlation);
    println!();

    println!("OUTPUT FILES");
    println!("{}", "-".repeat(40));
    println!("  - {}", result.cleaned_path.display());
    for chart in &result.chart_paths {
        println!("  - {}", chart.display());
    }
    if let Some(report) = &result.report_path {
        println!("  - {}", report.display());
    }
    println!("{}", "=".repeat(80));
}

fn print_missing(before: &MissingCounts, after: &MissingCounts) {
    println!("  {:<25} {:>8} {:>8}", "Column", "Before", "After");
    println!("  {}", "-".repeat(43));
    for (name, count) in &before.columns {
        println!(
            "  {:<25} {:>8} {:>8}",
            truncate_str(name, 25),
            count,
            after.get(name).unwrap_or(0)
        );
    }
    println!(
        "  {:<25} {:>8} {:>8}",
        "Total",
        before.total(),
        after.total()
    );
}

fn print_ranking(title: &str, metric: &str, products: &[ProductTotal]) {
    println!("{}", title);
    println!("{}", "-".repeat(40));
    println!("  {:<4} {:<34} {:>14}", "#", "Product ID", metric);
    for (rank, product) in products.iter().enumerate() {
        println!(
            "  {:<4} {:<34} {:>14.2}",
            rank + 1,
            truncate_str(&product.product_id, 34),
            product.total
        );
    }
    println!();
}

fn print_correlation(matrix: &CorrelationMatrix) {
    print!("  {:<20}", "");
    for name in &matrix.columns {
        print!(" {:>12}", truncate_str(name, 12));
    }
    println!();
    for (name, row) in matrix.columns.iter().zip(&matrix.values) {
        print!("  {:<20}", truncate_str(name, 20));
        for value in row {
            if value.is_nan() {
                print!(" {:>12}", "NaN");
            } else {
                print!(" {:>12.3}", value);
            }
        }
        println!();
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
