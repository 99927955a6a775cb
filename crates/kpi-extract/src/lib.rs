//! Monthly KPI Extraction Library
//!
//! Extracts a fixed block of monthly KPI columns from a spreadsheet, cleans
//! and mean-imputes missing values, and writes a tidy CSV. Built on
//! `calamine` for reading workbooks and Polars for the output table.
//!
//! # Overview
//!
//! A run is a linear sequence of steps:
//!
//! - **Load**: read one sheet of the workbook into a [`SourceTable`]
//! - **Slice**: select the KPI columns (positions 8 to 12 by default)
//! - **Validate**: the block's first row must match the expected month
//!   labels exactly, or the run fails with a [`SchemaError`]
//! - **Clean**: the sentinel token, empty cells and unparseable values
//!   become missing
//! - **Impute**: missing values are replaced with the column mean
//! - **Write**: the result goes to `kpi.csv`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kpi_extract::{ExtractionConfig, Pipeline};
//!
//! // Default contract: first sheet of "Данные для хакатона.xlsx" → kpi.csv
//! let result = kpi_extract::run("Данные для хакатона.xlsx")?;
//! println!("{}", result.summary);
//!
//! // Custom configuration
//! let config = ExtractionConfig::builder()
//!     .source_path("export.xlsx")
//!     .output_path("out/kpi.csv")
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.run()?;
//! ```
//!
//! # Testing without files
//!
//! [`Pipeline::process`] runs every step except loading and writing against
//! an in-memory [`SourceTable`]:
//!
//! ```rust,ignore
//! use kpi_extract::{Cell, Pipeline, SourceTable};
//!
//! let table = SourceTable::new(rows);
//! let result = Pipeline::builder().build()?.process(&table)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod extractor;
pub mod imputers;
pub mod pipeline;
pub mod reporting;
pub mod source;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{ColumnCleaner, CoercedCell};
pub use config::{
    ConfigValidationError, ExtractionConfig, ExtractionConfigBuilder, InvalidValuePolicy,
    SheetSelector,
};
pub use error::{KpiError, Result as KpiResult, ResultExt, SchemaError};
pub use extractor::KpiBlock;
pub use imputers::StatisticalImputer;
pub use pipeline::{ExtractionExecutor, Pipeline, PipelineBuilder, PipelineStage};
pub use reporting::{ColumnSummary, CsvOutput, JsonReport, SummaryStats, render_console_report};
pub use source::WorkbookLoader;
pub use types::{Cell, ColumnReport, PipelineResult, SourceTable};

use std::path::Path;

/// Run the extraction with the default configuration against `source_path`.
///
/// Writes `kpi.csv` in the working directory and returns the output table
/// with its summary statistics.
pub fn run(source_path: impl AsRef<Path>) -> KpiResult<PipelineResult> {
    let config = ExtractionConfig::builder()
        .source_path(source_path.as_ref())
        .build()?;
    Pipeline::builder().config(config).build()?.run()
}
