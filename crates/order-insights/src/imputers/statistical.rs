//! Statistical imputation methods.
//!
//! Each fill value is computed once from the column's non-missing values and
//! then applied to every gap in that column. A column with gaps but no
//! non-missing value has no defined fill value and fails the run.

use crate::error::{AnalysisError, Result};
use crate::types::{ColumnKind, Table};
use crate::utils::{
    fill_datetime_nulls, fill_numeric_nulls, fill_string_nulls, mode_first_seen, string_values,
};
use chrono::DateTime;
use polars::prelude::*;
use tracing::debug;

const NO_VALUES_FOR_MEDIAN: &str = "no valid values for median";

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill a column's gaps with the statistic its kind calls for.
    ///
    /// Columns without missing values are left untouched.
    pub fn impute(
        table: &mut Table,
        col_name: &str,
        kind: ColumnKind,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        if table.series(col_name)?.null_count() == 0 {
            return Ok(());
        }

        match kind {
            ColumnKind::Numeric => Self::apply_numeric_median(table, col_name, processing_steps),
            ColumnKind::Timestamp => {
                Self::apply_timestamp_median(table, col_name, processing_steps)
            }
            ColumnKind::Categorical => {
                Self::apply_mode_imputation(table, col_name, processing_steps)
            }
        }
    }

    /// Apply median imputation for numeric columns.
    pub fn apply_numeric_median(
        table: &mut Table,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let series = table.series(col_name)?;
        let median_val = series
            .median()
            .ok_or_else(|| AnalysisError::undefined(col_name, NO_VALUES_FOR_MEDIAN))?;

        let filled = fill_numeric_nulls(series, median_val)?;
        table.replace_column(col_name, filled)?;

        debug!("Imputed '{}' with median {}", col_name, median_val);
        processing_steps.push(format!(
            "Filled '{}' with median: {:.2}",
            col_name, median_val
        ));
        Ok(())
    }

    /// Apply median imputation for timestamp columns.
    pub fn apply_timestamp_median(
        table: &mut Table,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let series = table.series(col_name)?;
        let instants = series
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?;
        // Even counts give the midpoint of the middle pair, truncated to the millisecond.
        let median_ms = instants
            .median()
            .map(|ms| ms.trunc() as i64)
            .ok_or_else(|| AnalysisError::undefined(col_name, NO_VALUES_FOR_MEDIAN))?;

        let filled = fill_datetime_nulls(series, median_ms)?;
        table.replace_column(col_name, filled)?;

        let shown = DateTime::from_timestamp_millis(median_ms)
            .map(|dt| dt.naive_utc().to_string())
            .unwrap_or_else(|| median_ms.to_string());
        debug!("Imputed '{}' with median instant {}", col_name, shown);
        processing_steps.push(format!("Filled '{}' with median: {}", col_name, shown));
        Ok(())
    }

    /// Apply mode imputation for categorical columns.
    ///
    /// Ties between equally frequent values go to the one appearing first.
    pub fn apply_mode_imputation(
        table: &mut Table,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let series = table.series(col_name)?;
        let values = string_values(series)?;
        let mode_val = mode_first_seen(values.iter().flatten().map(String::as_str))
            .ok_or_else(|| AnalysisError::undefined(col_name, "no valid values for mode"))?;

        let filled = fill_string_nulls(series, &mode_val)?;
        table.replace_column(col_name, filled)?;

        debug!("Imputed '{}' with mode '{}'", col_name, mode_val);
        processing_steps.push(format!("Filled '{}' with mode: '{}'", col_name, mode_val));
        Ok(())
    }
}
