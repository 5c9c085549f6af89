//! Dataset loading.
//!
//! The loader reads the source file with every column as text and leaves all
//! type coercion to the cleaner. A file whose header is `;`-joined holds packed
//! records: each line is read raw, with quoting off, and split positionally
//! onto [`ORDER_SCHEMA`].

use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::{ORDER_SCHEMA, Table};
use crate::utils::{normalize_text, string_values};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Separator of records packed into a single column.
pub const RECORD_DELIMITER: char = ';';

/// CSV separator used to read packed lines whole (ASCII unit separator).
const RAW_LINE_SEPARATOR: u8 = 0x1f;

/// Loads the order dataset into a [`Table`].
pub struct Loader;

impl Loader {
    /// Read a dataset file and tag its columns.
    pub fn load(path: impl AsRef<Path>) -> Result<Table> {
        let path = path.as_ref();
        info!("Loading dataset from: {}", path.display());

        let df = Self::read_frame(path)?;
        let df = if df.width() == 1 {
            debug!("Single-column input, splitting records on '{}'", RECORD_DELIMITER);
            Self::split_single_column(&df)?
        } else {
            df
        };

        info!("Dataset loaded: {} rows x {} columns", df.height(), df.width());
        Ok(Table::new(df))
    }

    /// Read the file as text columns with a header row.
    ///
    /// Packed files come back as one column of raw lines.
    pub fn read_frame(path: &Path) -> Result<DataFrame> {
        if !path.is_file() {
            let missing = std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            );
            return Err(AnalysisError::Io(missing).with_context("Failed to read dataset"));
        }

        let mut options = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0));

        if Self::is_packed_header(&Self::read_header(path)?) {
            debug!("Packed header, reading raw lines");
            options = options.map_parse_options(|parse| {
                parse
                    .with_separator(RAW_LINE_SEPARATOR)
                    .with_quote_char(None)
                    .with_truncate_ragged_lines(true)
            });
        }

        options
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .context(format!("Failed to read dataset '{}'", path.display()))
    }

    /// Whether a header line names `;`-joined fields rather than CSV columns.
    pub fn is_packed_header(header: &str) -> bool {
        header.contains(RECORD_DELIMITER) && !header.contains(',')
    }

    fn read_header(path: &Path) -> Result<String> {
        let file = File::open(path).context(format!("Opening '{}'", path.display()))?;
        let mut header = String::new();
        BufReader::new(file)
            .read_line(&mut header)
            .context(format!("Reading header of '{}'", path.display()))?;
        Ok(header)
    }

    /// Split a one-column frame of `;`-joined records into the order schema.
    ///
    /// Short records leave their trailing columns missing, extra parts are
    /// dropped, and blank parts are missing. No record is rejected.
    pub fn split_single_column(df: &DataFrame) -> Result<DataFrame> {
        let source = df
            .get_columns()
            .first()
            .map(|col| col.as_materialized_series().clone())
            .unwrap_or_else(|| Series::new_empty(PlSmallStr::EMPTY, &DataType::String));

        let mut fields: Vec<Vec<Option<String>>> =
            vec![Vec::with_capacity(source.len()); ORDER_SCHEMA.len()];
        let mut mismatched = 0usize;

        for record in string_values(&source)? {
            let parts: Vec<&str> = record
                .as_deref()
                .map(|r| r.split(RECORD_DELIMITER).collect())
                .unwrap_or_default();

            if parts.len() != ORDER_SCHEMA.len() {
                mismatched += 1;
            }

            for (idx, field) in fields.iter_mut().enumerate() {
                field.push(parts.get(idx).and_then(|part| normalize_text(part)));
            }
        }

        if mismatched > 0 {
            warn!(
                "{} of {} records did not have {} fields; absent fields left missing",
                mismatched,
                source.len(),
                ORDER_SCHEMA.len()
            );
        }

        let columns: Vec<Column> = ORDER_SCHEMA
            .iter()
            .zip(fields)
            .map(|((name, _), values)| Series::new((*name).into(), values).into())
            .collect();

        Ok(DataFrame::new(columns)?)
    }
}
