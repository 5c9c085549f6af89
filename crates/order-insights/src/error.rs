//! Error types for the order analysis pipeline.
//!
//! Per-cell parse failures and malformed records never surface here; they are
//! absorbed into missing values by the loader and the cleaner. What remains are
//! the failures that abort a run: unreadable or unwritable files, statistics
//! that cannot be computed, and chart rendering errors.
//!
//! Errors serialize as `{ "code", "message" }` so they can be embedded in the
//! JSON analysis report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A statistic has no defined value for the column (no valid data, no rows).
    #[error("Undefined result for column '{column}': {reason}")]
    ComputeUndefined { column: String, reason: String },

    /// Column holds a dtype the stage cannot work with.
    #[error("Column '{column}' has unsupported type {dtype}")]
    UnsupportedType { column: String, dtype: String },

    /// Chart rendering failed.
    #[error("Failed to render chart: {0}")]
    RenderFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Shorthand for [`AnalysisError::ComputeUndefined`].
    pub fn undefined(column: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::ComputeUndefined {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, used in the JSON report.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ComputeUndefined { .. } => "COMPUTE_UNDEFINED",
            Self::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            Self::RenderFailed(_) => "RENDER_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a missing-statistic failure.
    pub fn is_compute_undefined(&self) -> bool {
        match self {
            Self::ComputeUndefined { .. } => true,
            Self::WithContext { source, .. } => source.is_compute_undefined(),
            _ => false,
        }
    }

    /// Check if this error comes from the file layer.
    pub fn is_io(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Polars(polars::error::PolarsError::IO { .. }) => true,
            Self::WithContext { source, .. } => source.is_io(),
            _ => false,
        }
    }
}

impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Io(e).with_context(context))
    }
}
