//! Configuration types for the KPI extraction pipeline.
//!
//! Everything the extraction depends on (where the workbook lives, which
//! sheet and columns hold the KPI block, what the header must look like, how
//! bad values are treated and where the CSV goes) is captured in an
//! [`ExtractionConfig`]. The defaults reproduce the fixed contract of the
//! monthly KPI workbook; tests and callers can override any of it through
//! the builder.

use crate::error::{KpiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default input workbook name.
pub const DEFAULT_SOURCE_PATH: &str = "Данные для хакатона.xlsx";

/// Default output CSV name.
pub const DEFAULT_OUTPUT_PATH: &str = "kpi.csv";

/// Month labels as they appear in the workbook header row.
pub const SOURCE_MONTH_LABELS: [&str; 5] = ["июнь", "июль", "август", "сентябрь", "октябрь"];

/// Canonical month names used to build output column names.
pub const MONTH_NAMES: [&str; 5] = ["june", "july", "august", "september", "october"];

/// Token used in the workbook for an explicitly absent measurement.
pub const DEFAULT_SENTINEL: &str = "нет";

/// Positional index of the first KPI column (column I).
pub const DEFAULT_FIRST_COLUMN: usize = 8;

/// Which sheet of the workbook to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SheetSelector {
    /// The first sheet in workbook order
    #[default]
    First,
    /// Sheet at the given zero-based position
    Index(usize),
    /// Sheet with the given name
    Name(String),
}

/// What to do with a cell that is neither the sentinel nor a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InvalidValuePolicy {
    /// Treat the value as missing and impute it like the sentinel
    #[default]
    TreatAsMissing,
    /// Abort the run with [`KpiError::InvalidValue`]
    Reject,
}

/// Configuration for a single extraction run.
///
/// Use [`ExtractionConfig::builder()`] to override individual settings.
///
/// # Example
///
/// ```rust,ignore
/// use kpi_extract::config::{ExtractionConfig, InvalidValuePolicy};
///
/// let config = ExtractionConfig::builder()
///     .source_path("export.xlsx")
///     .output_path("out/kpi.csv")
///     .invalid_value_policy(InvalidValuePolicy::Reject)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Workbook to read.
    /// Default: "Данные для хакатона.xlsx"
    pub source_path: PathBuf,

    /// Sheet holding the KPI data.
    /// Default: First
    pub sheet: SheetSelector,

    /// Number of leading sheet rows consumed as column labels and excluded
    /// from the source table. The KPI header is the first row after them.
    /// Default: 1
    pub label_rows: usize,

    /// Zero-based position of the first KPI column. The block spans
    /// `expected_header.len()` columns from here.
    /// Default: 8
    pub first_column: usize,

    /// Labels the first row of the KPI block must match exactly, in order.
    /// Default: June to October in Russian
    pub expected_header: Vec<String>,

    /// Cell text marking an absent measurement.
    /// Default: "нет"
    pub sentinel: String,

    /// Output column names, one per KPI column.
    /// Default: kpi_june .. kpi_october
    pub output_columns: Vec<String>,

    /// Handling of values that are neither the sentinel nor numeric.
    /// Default: TreatAsMissing
    pub invalid_value_policy: InvalidValuePolicy,

    /// Destination CSV.
    /// Default: "kpi.csv"
    pub output_path: PathBuf,

    /// Number of rows shown in the console preview.
    /// Default: 5
    pub preview_rows: usize,

    /// Whether to write the CSV at all. When false the run only computes
    /// and reports.
    /// Default: true
    pub write_output: bool,

    /// Write to a temporary file next to the destination and rename it into
    /// place, so a failed write never leaves a truncated CSV behind.
    /// Default: true
    pub atomic_write: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            sheet: SheetSelector::default(),
            label_rows: 1,
            first_column: DEFAULT_FIRST_COLUMN,
            expected_header: SOURCE_MONTH_LABELS.iter().map(|s| s.to_string()).collect(),
            sentinel: DEFAULT_SENTINEL.to_string(),
            output_columns: default_output_columns(),
            invalid_value_policy: InvalidValuePolicy::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            preview_rows: 5,
            write_output: true,
            atomic_write: true,
        }
    }
}

/// Output column names derived from the canonical month names.
pub fn default_output_columns() -> Vec<String> {
    MONTH_NAMES.iter().map(|m| format!("kpi_{}", m)).collect()
}

impl ExtractionConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults; the result is validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            KpiError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config
            .validate()
            .map_err(|e| KpiError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Half-open range of source columns forming the KPI block.
    ///
    /// Saturates instead of overflowing; [`validate`](Self::validate) rejects
    /// positions whose block end does not fit in a `usize`.
    pub fn column_range(&self) -> std::ops::Range<usize> {
        self.first_column..self.first_column.saturating_add(self.expected_header.len())
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.expected_header.is_empty() {
            return Err(ConfigValidationError::EmptyHeader);
        }

        if self.expected_header.len() != self.output_columns.len() {
            return Err(ConfigValidationError::ColumnCountMismatch {
                header: self.expected_header.len(),
                output: self.output_columns.len(),
            });
        }

        if self
            .first_column
            .checked_add(self.expected_header.len())
            .is_none()
        {
            return Err(ConfigValidationError::ColumnRangeOverflow {
                first_column: self.first_column,
                width: self.expected_header.len(),
            });
        }

        let mut seen = HashSet::new();
        for name in &self.output_columns {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyOutputColumn);
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigValidationError::DuplicateOutputColumn(name.clone()));
            }
        }

        if self.sentinel.is_empty() {
            return Err(ConfigValidationError::EmptySentinel);
        }

        if self.preview_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(self.preview_rows));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Expected header must contain at least one label")]
    EmptyHeader,

    #[error("Expected header has {header} labels but {output} output columns are configured")]
    ColumnCountMismatch { header: usize, output: usize },

    #[error("First column {first_column} plus {width} KPI columns exceeds the addressable range")]
    ColumnRangeOverflow { first_column: usize, width: usize },

    #[error("Output column names must not be empty")]
    EmptyOutputColumn,

    #[error("Duplicate output column name: '{0}'")]
    DuplicateOutputColumn(String),

    #[error("Sentinel token must not be empty")]
    EmptySentinel,

    #[error("Invalid preview rows: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),
}

impl From<ConfigValidationError> for KpiError {
    fn from(err: ConfigValidationError) -> Self {
        KpiError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`ExtractionConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ExtractionConfigBuilder {
    base: Option<ExtractionConfig>,
    source_path: Option<PathBuf>,
    sheet: Option<SheetSelector>,
    label_rows: Option<usize>,
    first_column: Option<usize>,
    expected_header: Option<Vec<String>>,
    sentinel: Option<String>,
    output_columns: Option<Vec<String>>,
    invalid_value_policy: Option<InvalidValuePolicy>,
    output_path: Option<PathBuf>,
    preview_rows: Option<usize>,
    write_output: Option<bool>,
    atomic_write: Option<bool>,
}

impl ExtractionConfigBuilder {
    /// Start from an existing configuration instead of the defaults.
    ///
    /// Used by the CLI to layer flags over a config file.
    pub fn from_config(config: ExtractionConfig) -> Self {
        Self {
            base: Some(config),
            ..Self::default()
        }
    }

    /// Set the workbook to read.
    pub fn source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Set which sheet to read.
    pub fn sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = Some(sheet);
        self
    }

    /// Set how many leading rows are column labels.
    pub fn label_rows(mut self, rows: usize) -> Self {
        self.label_rows = Some(rows);
        self
    }

    /// Set the position of the first KPI column.
    pub fn first_column(mut self, column: usize) -> Self {
        self.first_column = Some(column);
        self
    }

    /// Set the labels the KPI header row must match.
    pub fn expected_header<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_header = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Set the missing-value sentinel.
    pub fn sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = Some(sentinel.into());
        self
    }

    /// Set the output column names.
    pub fn output_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_columns = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Set the policy for unparseable values.
    pub fn invalid_value_policy(mut self, policy: InvalidValuePolicy) -> Self {
        self.invalid_value_policy = Some(policy);
        self
    }

    /// Set the destination CSV.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set the number of rows in the console preview.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Enable or disable writing the CSV.
    pub fn write_output(mut self, write: bool) -> Self {
        self.write_output = Some(write);
        self
    }

    /// Enable or disable temp-file-then-rename writes.
    pub fn atomic_write(mut self, atomic: bool) -> Self {
        self.atomic_write = Some(atomic);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ExtractionConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<ExtractionConfig, ConfigValidationError> {
        let base = self.base.unwrap_or_default();
        let config = ExtractionConfig {
            source_path: self.source_path.unwrap_or(base.source_path),
            sheet: self.sheet.unwrap_or(base.sheet),
            label_rows: self.label_rows.unwrap_or(base.label_rows),
            first_column: self.first_column.unwrap_or(base.first_column),
            expected_header: self.expected_header.unwrap_or(base.expected_header),
            sentinel: self.sentinel.unwrap_or(base.sentinel),
            output_columns: self.output_columns.unwrap_or(base.output_columns),
            invalid_value_policy: self
                .invalid_value_policy
                .unwrap_or(base.invalid_value_policy),
            output_path: self.output_path.unwrap_or(base.output_path),
            preview_rows: self.preview_rows.unwrap_or(base.preview_rows),
            write_output: self.write_output.unwrap_or(base.write_output),
            atomic_write: self.atomic_write.unwrap_or(base.atomic_write),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractionConfig::default();
        assert_eq!(config.source_path, PathBuf::from("Данные для хакатона.xlsx"));
        assert_eq!(config.sheet, SheetSelector::First);
        assert_eq!(config.label_rows, 1);
        assert_eq!(config.column_range(), 8..13);
        assert_eq!(
            config.expected_header,
            vec!["июнь", "июль", "август", "сентябрь", "октябрь"]
        );
        assert_eq!(config.sentinel, "нет");
        assert_eq!(
            config.output_columns,
            vec![
                "kpi_june",
                "kpi_july",
                "kpi_august",
                "kpi_september",
                "kpi_october"
            ]
        );
        assert_eq!(config.invalid_value_policy, InvalidValuePolicy::TreatAsMissing);
        assert_eq!(config.output_path, PathBuf::from("kpi.csv"));
        assert!(config.write_output);
        assert!(config.atomic_write);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_defaults() {
        let config = ExtractionConfig::builder().build().unwrap();
        assert_eq!(config, ExtractionConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = ExtractionConfig::builder()
            .source_path("in.xlsx")
            .sheet(SheetSelector::Name("KPI".to_string()))
            .first_column(2)
            .expected_header(["a", "b"])
            .output_columns(["x", "y"])
            .sentinel("n/a")
            .invalid_value_policy(InvalidValuePolicy::Reject)
            .preview_rows(3)
            .write_output(false)
            .build()
            .unwrap();

        assert_eq!(config.source_path, PathBuf::from("in.xlsx"));
        assert_eq!(config.sheet, SheetSelector::Name("KPI".to_string()));
        assert_eq!(config.column_range(), 2..4);
        assert_eq!(config.sentinel, "n/a");
        assert_eq!(config.invalid_value_policy, InvalidValuePolicy::Reject);
        assert_eq!(config.preview_rows, 3);
        assert!(!config.write_output);
    }

    #[test]
    fn test_builder_layers_over_base() {
        let base = ExtractionConfig::builder()
            .sentinel("none")
            .first_column(3)
            .build()
            .unwrap();

        let config = ExtractionConfigBuilder::from_config(base)
            .first_column(4)
            .build()
            .unwrap();

        assert_eq!(config.sentinel, "none");
        assert_eq!(config.first_column, 4);
    }

    #[test]
    fn test_validation_column_count_mismatch() {
        let result = ExtractionConfig::builder()
            .expected_header(["a", "b", "c"])
            .build();

        assert_eq!(
            result.unwrap_err(),
            ConfigValidationError::ColumnCountMismatch {
                header: 3,
                output: 5
            }
        );
    }

    #[test]
    fn test_validation_empty_header() {
        let result = ExtractionConfig::builder()
            .expected_header(Vec::<String>::new())
            .output_columns(Vec::<String>::new())
            .build();

        assert_eq!(result.unwrap_err(), ConfigValidationError::EmptyHeader);
    }

    #[test]
    fn test_validation_duplicate_output_column() {
        let result = ExtractionConfig::builder()
            .expected_header(["a", "b"])
            .output_columns(["x", "x"])
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateOutputColumn(name) if name == "x"
        ));
    }

    #[test]
    fn test_validation_empty_sentinel_and_preview() {
        assert_eq!(
            ExtractionConfig::builder().sentinel("").build().unwrap_err(),
            ConfigValidationError::EmptySentinel
        );
        assert_eq!(
            ExtractionConfig::builder().preview_rows(0).build().unwrap_err(),
            ConfigValidationError::InvalidPreviewRows(0)
        );
    }

    #[test]
    fn test_validation_first_column_overflow() {
        assert_eq!(
            ExtractionConfig::builder()
                .first_column(usize::MAX)
                .build()
                .unwrap_err(),
            ConfigValidationError::ColumnRangeOverflow {
                first_column: usize::MAX,
                width: 5
            }
        );

        // largest position whose block end still fits
        let config = ExtractionConfig::builder()
            .first_column(usize::MAX - 5)
            .build()
            .unwrap();
        assert_eq!(config.column_range(), usize::MAX - 5..usize::MAX);
    }

    #[test]
    fn test_column_range_saturates_on_unvalidated_config() {
        let config = ExtractionConfig {
            first_column: usize::MAX - 1,
            ..ExtractionConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.column_range(), usize::MAX - 1..usize::MAX);
    }

    #[test]
    fn test_json_first_column_overflow_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, format!(r#"{{ "first_column": {} }}"#, usize::MAX)).unwrap();

        let err = ExtractionConfig::from_json_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_config_serialization() {
        let config = ExtractionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ExtractionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "source_path": "export.xlsx",
            "sheet": { "Index": 2 },
            "invalid_value_policy": "Reject"
        }"#;

        let config: ExtractionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.source_path, PathBuf::from("export.xlsx"));
        assert_eq!(config.sheet, SheetSelector::Index(2));
        assert_eq!(config.invalid_value_policy, InvalidValuePolicy::Reject);
        assert_eq!(config.first_column, 8);
        assert_eq!(config.sentinel, "нет");
    }

    #[test]
    fn test_from_json_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "sentinel": "" }"#).unwrap();

        let err = ExtractionConfig::from_json_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = ExtractionConfig::from_json_file("/nonexistent/config.json").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
