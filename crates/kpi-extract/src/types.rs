//! Core data types shared across the extraction pipeline.

use crate::reporting::SummaryStats;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A single spreadsheet cell as seen by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Cell {
    /// No value
    #[default]
    Empty,
    /// Text value
    Text(String),
    /// Numeric value (spreadsheet integers are widened to f64)
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Anything else (dates, durations, spreadsheet error values),
    /// kept in its display form
    Other(String),
}

impl Cell {
    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) | Cell::Other(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

/// Ordered rows of heterogeneous cells read from one sheet.
///
/// Rows may be ragged; a cell past the end of a row reads as [`Cell::Empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceTable {
    rows: Vec<Vec<Cell>>,
}

impl SourceTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, i.e. the length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Cell at (row, column); out-of-range positions are empty.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(EMPTY)
    }
}

impl<R, C> FromIterator<R> for SourceTable
where
    R: IntoIterator<Item = C>,
    C: Into<Cell>,
{
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}

/// What happened to one KPI column during cleaning and imputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReport {
    /// Output column name
    pub name: String,
    /// Label found in the header row
    pub source_label: String,
    /// Number of data rows
    pub rows: usize,
    /// Cells holding the sentinel token
    pub sentinel_count: usize,
    /// Cells that were neither the sentinel nor numeric
    pub invalid_count: usize,
    /// Cells with no value
    pub empty_count: usize,
    /// Mean used to fill missing cells; None when the column had no valid values
    pub fill_value: Option<f64>,
}

impl ColumnReport {
    /// Total cells replaced by the fill value.
    pub fn missing_count(&self) -> usize {
        self.sentinel_count + self.invalid_count + self.empty_count
    }
}

/// Result of a full extraction run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Cleaned KPI table, one Float64 column per month
    pub data: DataFrame,
    /// Descriptive statistics of `data`
    pub summary: SummaryStats,
    /// Per-column cleaning details
    pub columns: Vec<ColumnReport>,
    /// Where the CSV was written, if it was
    pub output_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_table_dimensions() {
        let table = SourceTable::new(vec![
            vec![Cell::from("a"), Cell::from(1.0)],
            vec![Cell::from("b")],
        ]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.width(), 2);
        assert_eq!(table.cell(1, 1), &Cell::Empty);
        assert_eq!(table.cell(5, 0), &Cell::Empty);
        assert_eq!(table.cell(0, 1), &Cell::Number(1.0));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::from("нет").to_string(), "нет");
        assert_eq!(Cell::from(2.5).to_string(), "2.5");
        assert_eq!(Cell::Empty.to_string(), "");
        assert_eq!(Cell::from(true).to_string(), "true");
    }

    #[test]
    fn test_missing_count() {
        let report = ColumnReport {
            name: "kpi_june".to_string(),
            source_label: "июнь".to_string(),
            rows: 10,
            sentinel_count: 2,
            invalid_count: 1,
            empty_count: 3,
            fill_value: Some(1.0),
        };
        assert_eq!(report.missing_count(), 6);
    }
}
