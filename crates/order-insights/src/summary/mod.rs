//! Sales summarization.
//!
//! Works on a cleaned table: every column the summarizer reads must be free of
//! missing values, which the cleaner guarantees. Sums, means and groupings run
//! on polars; only the pairwise correlation works on plain slices.

mod statistics;

use crate::error::{AnalysisError, Result};
use crate::types::{
    CORRELATION_COLUMNS, ColumnKind, CorrelationMatrix, MonthlyTotal, PRICE, PRODUCT_ID,
    PURCHASE_DATE, ProductTotal, QUANTITY, SalesSummary, TOTAL_SALES, Table,
};
use crate::utils::{f64_values, string_values};
use polars::prelude::*;
use statistics::{has_variance, pearson};
use tracing::{debug, info, warn};

/// Aggregated column of the ranking and trend frames.
const GROUP_TOTAL: &str = "group_total";
const YEAR: &str = "year";
const MONTH: &str = "month";

/// Derives sales figures from a cleaned table.
pub struct Summarizer;

impl Summarizer {
    /// Append `total_sales = quantity * price`.
    pub fn with_total_sales(mut table: Table) -> Result<Table> {
        let quantity = complete_float(&table, QUANTITY)?;
        let price = complete_float(&table, PRICE)?;

        let totals = (&quantity * &price)?.with_name(TOTAL_SALES.into());
        table.push_column(totals, ColumnKind::Numeric)?;

        debug!("Derived '{}' for {} rows", TOTAL_SALES, table.height());
        Ok(table)
    }

    /// Compute every summary figure. Expects `total_sales` to be present.
    pub fn summarize(table: &Table, top: usize) -> Result<SalesSummary> {
        info!("Summarizing {} rows...", table.height());

        let sales = complete_float(table, TOTAL_SALES)?;
        let total_sales_sum = sales.sum::<f64>()?;
        let total_sales_mean = sales
            .mean()
            .ok_or_else(|| AnalysisError::undefined(TOTAL_SALES, "mean of an empty table"))?;
        let sales_values: Vec<f64> = sales.f64()?.into_no_null_iter().collect();

        let summary = SalesSummary {
            row_count: table.height(),
            total_sales_sum,
            total_sales_mean,
            top_by_quantity: Self::top_products(table, QUANTITY, top)?,
            top_by_revenue: Self::top_products(table, TOTAL_SALES, top)?,
            correlation: Self::correlation_matrix(table)?,
            monthly_trend: Self::monthly_trend(table)?,
            sales_values,
        };

        info!(
            "Total sales {:.2}, average per order {:.2}",
            summary.total_sales_sum, summary.total_sales_mean
        );
        Ok(summary)
    }

    /// Products ranked by the summed `metric`, largest first.
    ///
    /// Equal sums are ordered by ascending product id.
    pub fn top_products(table: &Table, metric: &str, n: usize) -> Result<Vec<ProductTotal>> {
        ensure_complete(table, PRODUCT_ID)?;
        ensure_complete(table, metric)?;
        let limit = IdxSize::try_from(n).unwrap_or(IdxSize::MAX);

        let ranked = table
            .frame()
            .clone()
            .lazy()
            .group_by([col(PRODUCT_ID)])
            .agg([col(metric).cast(DataType::Float64).sum().alias(GROUP_TOTAL)])
            .sort_by_exprs(
                [col(GROUP_TOTAL), col(PRODUCT_ID)],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .limit(limit)
            .collect()?;

        let ids = string_values(ranked.column(PRODUCT_ID)?.as_materialized_series())?;
        let totals = f64_values(ranked.column(GROUP_TOTAL)?.as_materialized_series())?;
        Ok(ids
            .into_iter()
            .zip(totals)
            .filter_map(|(product_id, total)| {
                Some(ProductTotal {
                    product_id: product_id?,
                    total: total?,
                })
            })
            .collect())
    }

    /// Pearson correlation across the numeric order columns present in the table.
    ///
    /// Pairs involving a constant column are NaN; the diagonal of every other
    /// column is exactly 1.0.
    pub fn correlation_matrix(table: &Table) -> Result<CorrelationMatrix> {
        let mut columns = Vec::new();
        let mut data = Vec::new();
        for name in CORRELATION_COLUMNS {
            if table.kind_of(name).is_some() {
                data.push(complete_f64(table, name)?);
                columns.push(name.to_string());
            }
        }

        let varying: Vec<bool> = data.iter().map(|values| has_variance(values)).collect();
        for (name, _) in columns.iter().zip(&varying).filter(|(_, v)| !**v) {
            warn!("Column '{}' has zero variance; its correlations are NaN", name);
        }

        let k = columns.len();
        let mut values = vec![vec![f64::NAN; k]; k];
        for i in 0..k {
            if !varying[i] {
                continue;
            }
            values[i][i] = 1.0;
            for j in (i + 1)..k {
                if varying[j] {
                    let r = pearson(&data[i], &data[j]);
                    values[i][j] = r;
                    values[j][i] = r;
                }
            }
        }

        Ok(CorrelationMatrix { columns, values })
    }

    /// Sales summed per calendar month of `purchase_date`, oldest first.
    pub fn monthly_trend(table: &Table) -> Result<Vec<MonthlyTotal>> {
        ensure_complete(table, PURCHASE_DATE)?;
        ensure_complete(table, TOTAL_SALES)?;

        let date = col(PURCHASE_DATE).cast(DataType::Datetime(TimeUnit::Milliseconds, None));
        let monthly = table
            .frame()
            .clone()
            .lazy()
            .group_by([
                date.clone().dt().year().alias(YEAR),
                date.dt().month().alias(MONTH),
            ])
            .agg([col(TOTAL_SALES).cast(DataType::Float64).sum().alias(GROUP_TOTAL)])
            .sort_by_exprs([col(YEAR), col(MONTH)], SortMultipleOptions::default())
            .collect()?;

        let years = int_values(&monthly, YEAR)?;
        let months = int_values(&monthly, MONTH)?;
        let totals = f64_values(monthly.column(GROUP_TOTAL)?.as_materialized_series())?;

        years
            .into_iter()
            .zip(months)
            .zip(totals)
            .map(|((year, month), total)| match (year, month, total) {
                (Some(year), Some(month), Some(total)) => Ok(MonthlyTotal {
                    year: i32::try_from(year).map_err(|_| out_of_range())?,
                    month: u32::try_from(month).map_err(|_| out_of_range())?,
                    total,
                }),
                _ => Err(out_of_range()),
            })
            .collect()
    }
}

fn out_of_range() -> AnalysisError {
    AnalysisError::undefined(PURCHASE_DATE, "missing or out-of-range instant")
}

/// A column that must not contain missing cells.
fn ensure_complete<'a>(table: &'a Table, name: &str) -> Result<&'a Series> {
    let series = table.series(name)?;
    if series.null_count() > 0 {
        return Err(AnalysisError::undefined(name, "column still has missing values"));
    }
    Ok(series)
}

/// A complete column as Float64.
fn complete_float(table: &Table, name: &str) -> Result<Series> {
    Ok(ensure_complete(table, name)?.cast(&DataType::Float64)?)
}

/// Float values of a column that must not contain missing cells.
fn complete_f64(table: &Table, name: &str) -> Result<Vec<f64>> {
    Ok(complete_float(table, name)?.f64()?.into_no_null_iter().collect())
}

fn int_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let cast = frame
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    Ok(cast.i64()?.into_iter().collect())
}
