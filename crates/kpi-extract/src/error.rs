//! Custom error types for the KPI extraction pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Every fatal
//! condition of a run (unreadable source, schema drift, rejected values,
//! failed writes) maps to one variant so callers can match on it instead of
//! parsing messages.
//!
//! Errors are serializable so the CLI can emit them as part of its JSON output.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// Schema violations detected while slicing or validating the KPI block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The source table is narrower than the configured column range.
    #[error("expected at least {required} columns, found {found}")]
    InsufficientColumns { required: usize, found: usize },

    /// The source table has no rows, so there is no header to validate.
    #[error("source table has no header row")]
    MissingHeaderRow,

    /// The header row of the KPI block does not match the expected labels.
    #[error("header mismatch: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// The main error type for the extraction pipeline.
#[derive(Error, Debug)]
pub enum KpiError {
    /// Source workbook is missing, corrupt or has no usable sheet.
    #[error("Failed to read source '{path}': {reason}")]
    SourceRead { path: PathBuf, reason: String },

    /// KPI block does not have the expected shape or header.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A cell could not be coerced and the policy forbids treating it as missing.
    #[error("Invalid value {value:?} in column '{column}' at data row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    /// Imputation failed.
    #[error("Failed to impute missing values in column '{column}': {reason}")]
    ImputationFailed { column: String, reason: String },

    /// Summary statistics could not be computed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// Output CSV could not be created or written.
    #[error("Failed to write '{path}': {reason}")]
    Write { path: PathBuf, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<KpiError>,
    },
}

impl KpiError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        KpiError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SourceRead { .. } => "SOURCE_READ_ERROR",
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::InvalidValue { .. } => "INVALID_VALUE",
            Self::ImputationFailed { .. } => "IMPUTATION_FAILED",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Write { .. } => "WRITE_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Return the schema violation, looking through any added context.
    pub fn as_schema_error(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(err) => Some(err),
            Self::WithContext { source, .. } => source.as_schema_error(),
            _ => None,
        }
    }

    /// Check if this error was caused by spreadsheet format drift.
    pub fn is_schema_error(&self) -> bool {
        self.as_schema_error().is_some()
    }

    pub(crate) fn source_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for KpiError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("KpiError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, KpiError>;

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
        self.map_err(|e| KpiError::Polars(e).with_context(context))
    }
}
