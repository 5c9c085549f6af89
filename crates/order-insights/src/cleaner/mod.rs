//! Data cleaning module.
//!
//! This module provides functionality for:
//! - Coercing every column to the storage type of its kind
//! - Imputing missing values column by column
//! - Writing the cleaned table to disk
//!
//! The cleaner takes the table by value and hands it back inside a
//! [`CleaningOutcome`]; after a successful run no column has missing values.

mod converters;

use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::types::{MissingCounts, Table};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Timestamp layout of the cleaned CSV file.
pub const CLEANED_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Result of a cleaning pass.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    /// The fully coerced, fully imputed table.
    pub table: Table,
    /// Missing cells per column after coercion, before imputation.
    pub missing_before: MissingCounts,
    /// Missing cells per column after imputation.
    pub missing_after: MissingCounts,
    /// Present values per column that failed to parse and became missing.
    pub parse_failures: Vec<(String, usize)>,
    /// Human-readable log of what was done.
    pub processing_steps: Vec<String>,
}

/// Data cleaner for type coercion and missing value imputation.
pub struct DataCleaner;

impl DataCleaner {
    /// Coerce and impute a table.
    ///
    /// Fill values are computed per column from that column alone, so the
    /// processing order of columns does not affect the result.
    pub fn clean(table: Table) -> Result<CleaningOutcome> {
        info!("Cleaning {} rows x {} columns...", table.height(), table.width());

        let (table, parse_failures) = Self::coerce_types(table)?;
        Self::impute(table, parse_failures)
    }

    /// Impute every gap of an already coerced table.
    ///
    /// `parse_failures` are the counts [`DataCleaner::coerce_types`] returned
    /// for the same table.
    pub fn impute(
        mut table: Table,
        parse_failures: Vec<(String, usize)>,
    ) -> Result<CleaningOutcome> {
        let missing_before = table.missing_counts();
        info!("Missing values before imputation: {}", missing_before.total());

        let mut processing_steps = Vec::new();
        for (failed_col, count) in &parse_failures {
            processing_steps.push(format!(
                "Coerced {} unparseable values in '{}' to missing",
                count, failed_col
            ));
        }

        for (name, kind) in table.columns() {
            StatisticalImputer::impute(&mut table, &name, kind, &mut processing_steps)
                .context("During imputation")?;
        }

        let missing_after = table.missing_counts();
        if missing_after.total() > 0 {
            warn!(
                "{} missing values remain after imputation",
                missing_after.total()
            );
        } else {
            info!("Missing values after imputation: 0");
        }

        Ok(CleaningOutcome {
            table,
            missing_before,
            missing_after,
            parse_failures,
            processing_steps,
        })
    }

    /// Convert each column to the storage type of its kind.
    ///
    /// Values that fail to parse become missing; the per-column failure
    /// counts are returned alongside the table.
    pub fn coerce_types(mut table: Table) -> Result<(Table, Vec<(String, usize)>)> {
        let mut failures = Vec::new();

        for (name, kind) in table.columns() {
            let (coerced, failed) = converters::coerce_column(table.series(&name)?, kind)
                .context(format!("Coercing column '{}'", name))?;
            table.replace_column(&name, coerced)?;

            if failed > 0 {
                debug!("{} values of '{}' failed {} parsing", failed, name, kind.as_str());
                failures.push((name, failed));
            }
        }

        Ok((table, failures))
    }

    /// Write the table as CSV, replacing any existing file at `path`.
    ///
    /// The data is written to a sibling temp file first and renamed into
    /// place, so `path` never holds a partial file.
    pub fn write_cleaned(table: &Table, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .context(format!("Creating output directory '{}'", parent.display()))?;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "cleaned.csv".to_string());
        let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

        let written = Self::write_csv(table, &tmp_path).and_then(|_| {
            fs::rename(&tmp_path, path)
                .context(format!("Moving cleaned data into '{}'", path.display()))
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        info!("Cleaned data saved to {}", path.display());
        Ok(path.to_path_buf())
    }

    fn write_csv(table: &Table, path: &Path) -> Result<()> {
        let mut df = table.frame().clone();
        let mut file =
            File::create(path).context(format!("Creating '{}'", path.display()))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .with_datetime_format(Some(CLEANED_DATETIME_FORMAT.to_string()))
            .finish(&mut df)
            .context(format!("Writing '{}'", path.display()))?;

        file.sync_all()
            .context(format!("Flushing '{}'", path.display()))?;
        Ok(())
    }
}
