//! Imputation module for handling missing values.
//!
//! The strategy is chosen by the column's [`ColumnKind`](crate::types::ColumnKind):
//! mode for categorical columns, median for numeric and timestamp columns.

mod statistical;

pub use statistical::StatisticalImputer;
