//! Core types shared by the pipeline stages.

use crate::error::{AnalysisError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Schema
// =============================================================================

/// How a column is coerced and which statistic fills its gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Free-form or categorical text; imputed with the mode.
    Categorical,
    /// Floating point quantity; imputed with the median.
    Numeric,
    /// Calendar date/time; imputed with the median instant.
    Timestamp,
}

impl ColumnKind {
    /// Kind of a column by name. Names outside the order schema are categorical.
    pub fn for_column(name: &str) -> Self {
        ORDER_SCHEMA
            .iter()
            .find(|(col, _)| *col == name)
            .map(|(_, kind)| *kind)
            .unwrap_or(ColumnKind::Categorical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Categorical => "categorical",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Timestamp => "timestamp",
        }
    }
}

pub const ORDER_ID: &str = "order_id";
pub const QUANTITY: &str = "quantity";
pub const PRODUCT_ID: &str = "product_id";
pub const PRICE: &str = "price";
pub const FREIGHT_VALUE: &str = "freight_value";
pub const PURCHASE_DATE: &str = "purchase_date";
pub const PRODUCT_WEIGHT_GRAM: &str = "product_weight_gram";
pub const TOTAL_SALES: &str = "total_sales";

/// The order dataset columns, in the positional order of a `;`-joined record.
pub const ORDER_SCHEMA: [(&str, ColumnKind); 12] = [
    (ORDER_ID, ColumnKind::Categorical),
    (QUANTITY, ColumnKind::Numeric),
    (PRODUCT_ID, ColumnKind::Categorical),
    (PRICE, ColumnKind::Numeric),
    ("seller_id", ColumnKind::Categorical),
    (FREIGHT_VALUE, ColumnKind::Numeric),
    ("customer_id", ColumnKind::Categorical),
    ("order_status", ColumnKind::Categorical),
    (PURCHASE_DATE, ColumnKind::Timestamp),
    ("payment_type", ColumnKind::Categorical),
    ("product_category_name", ColumnKind::Categorical),
    (PRODUCT_WEIGHT_GRAM, ColumnKind::Numeric),
];

/// Numeric columns entering the correlation matrix, in matrix order.
pub const CORRELATION_COLUMNS: [&str; 5] = [
    QUANTITY,
    PRICE,
    FREIGHT_VALUE,
    PRODUCT_WEIGHT_GRAM,
    TOTAL_SALES,
];

// =============================================================================
// Table
// =============================================================================

/// An ordered set of named, equal-length columns with a type tag per column.
///
/// The table moves by value from one pipeline stage to the next.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    kinds: Vec<ColumnKind>,
}

impl Table {
    /// Wrap a DataFrame, tagging each column from the order schema.
    pub fn new(frame: DataFrame) -> Self {
        let kinds = frame
            .get_column_names()
            .iter()
            .map(|name| ColumnKind::for_column(name.as_str()))
            .collect();
        Self { frame, kinds }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Column names paired with their kinds, in column order.
    pub fn columns(&self) -> Vec<(String, ColumnKind)> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .zip(self.kinds.iter().copied())
            .collect()
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.frame
            .get_column_index(name)
            .map(|idx| self.kinds[idx])
    }

    /// Materialized series of a column.
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|col| col.as_materialized_series())
            .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))
    }

    /// Swap a column's values, keeping its position and kind.
    pub(crate) fn replace_column(&mut self, name: &str, series: Series) -> Result<()> {
        if self.frame.get_column_index(name).is_none() {
            return Err(AnalysisError::ColumnNotFound(name.to_string()));
        }
        self.frame.replace(name, series)?;
        Ok(())
    }

    /// Append a column (or overwrite one of the same name) with an explicit kind.
    pub(crate) fn push_column(&mut self, series: Series, kind: ColumnKind) -> Result<()> {
        let existing = self.frame.get_column_index(series.name().as_str());
        self.frame.with_column(series)?;
        match existing {
            Some(idx) => self.kinds[idx] = kind,
            None => self.kinds.push(kind),
        }
        Ok(())
    }

    /// Count of missing cells per column, in column order.
    pub fn missing_counts(&self) -> MissingCounts {
        MissingCounts {
            columns: self
                .frame
                .get_columns()
                .iter()
                .map(|col| (col.name().to_string(), col.null_count()))
                .collect(),
        }
    }
}

/// Missing-cell counts per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCounts {
    pub columns: Vec<(String, usize)>,
}

impl MissingCounts {
    pub fn total(&self) -> usize {
        self.columns.iter().map(|(_, n)| n).sum()
    }

    pub fn get(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, n)| *n)
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Summed metric for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTotal {
    pub product_id: String,
    pub total: f64,
}

/// Summed sales for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

impl MonthlyTotal {
    /// `YYYY-MM` label.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Symmetric Pearson correlation matrix.
///
/// Entries involving a zero-variance column are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient for a pair of columns, if both are in the matrix.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Everything the summarizer derives from a cleaned table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesSummary {
    pub row_count: usize,
    pub total_sales_sum: f64,
    pub total_sales_mean: f64,
    pub top_by_quantity: Vec<ProductTotal>,
    pub top_by_revenue: Vec<ProductTotal>,
    pub correlation: CorrelationMatrix,
    pub monthly_trend: Vec<MonthlyTotal>,
    /// Per-row sales amounts, the histogram input.
    #[serde(skip)]
    pub sales_values: Vec<f64>,
}
