//! Report generation module.
//!
//! This module provides the descriptive statistics shown after a run, the
//! console rendering of a finished run, and the CSV writer.
//!
//! # Example
//!
//! ```rust,ignore
//! use kpi_extract::reporting::{CsvOutput, SummaryStats, render_console_report};
//!
//! let summary = SummaryStats::describe(&df)?;
//! println!("{}", summary);
//!
//! CsvOutput::new("kpi.csv").write(&df)?;
//! ```

mod summary;
mod writer;

pub use summary::{ColumnSummary, STAT_LABELS, SummaryStats};
pub use writer::CsvOutput;

use crate::types::PipelineResult;
use serde::Serialize;
use std::fmt::Write;

/// Render the human-readable report printed after a run: a confirmation
/// line, the first `preview_rows` rows and the summary statistics.
pub fn render_console_report(result: &PipelineResult, preview_rows: usize) -> String {
    let mut out = String::new();

    match &result.output_path {
        Some(path) => {
            let _ = writeln!(out, "{} created:", path.display());
        }
        None => {
            let _ = writeln!(out, "KPI table (not written):");
        }
    }
    let _ = writeln!(out, "{}", result.data.head(Some(preview_rows)));
    let _ = writeln!(out);
    let _ = write!(out, "{}", result.summary);
    out
}

/// Machine-readable report emitted with `--json`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub output_path: Option<String>,
    pub rows: usize,
    pub columns: &'a [crate::types::ColumnReport],
    pub summary: &'a SummaryStats,
}

impl<'a> JsonReport<'a> {
    pub fn from_result(result: &'a PipelineResult) -> Self {
        Self {
            output_path: result
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
            rows: result.data.height(),
            columns: &result.columns,
            summary: &result.summary,
        }
    }
}
