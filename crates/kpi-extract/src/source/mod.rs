//! Workbook loading.
//!
//! Reads one sheet of a spreadsheet into a [`SourceTable`] using `calamine`.
//! The format (xlsx, xlsm, xls, ods) is detected from the file extension.
//!
//! Column positions in the resulting table are absolute sheet positions:
//! if the sheet's used range starts at column C, columns A and B are padded
//! with [`Cell::Empty`] so that positional slicing stays stable.

use crate::config::{ExtractionConfig, SheetSelector};
use crate::error::{KpiError, Result};
use crate::types::{Cell, SourceTable};
use calamine::{Data, Range, Reader, open_workbook_auto};
use std::path::Path;
use tracing::{debug, info};

/// Loads the source table from a workbook on disk.
pub struct WorkbookLoader;

impl WorkbookLoader {
    /// Load the sheet described by `config`.
    pub fn load_from_config(config: &ExtractionConfig) -> Result<SourceTable> {
        Self::load(&config.source_path, &config.sheet, config.label_rows)
    }

    /// Load a sheet, skipping `label_rows` leading rows.
    ///
    /// Fails with [`KpiError::SourceRead`] if the file is missing or not a
    /// readable workbook, if it has no sheets, or if the requested sheet
    /// does not exist.
    pub fn load(path: &Path, sheet: &SheetSelector, label_rows: usize) -> Result<SourceTable> {
        if !path.exists() {
            return Err(KpiError::source_read(path, "file not found"));
        }

        let mut workbook =
            open_workbook_auto(path).map_err(|e| KpiError::source_read(path, e))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(KpiError::source_read(path, "workbook has no sheets"));
        }
        debug!("Sheets in workbook: {:?}", sheet_names);

        let sheet_name = match sheet {
            SheetSelector::First => sheet_names[0].clone(),
            SheetSelector::Index(idx) => sheet_names.get(*idx).cloned().ok_or_else(|| {
                KpiError::source_read(
                    path,
                    format!(
                        "sheet index {} out of range ({} sheets)",
                        idx,
                        sheet_names.len()
                    ),
                )
            })?,
            SheetSelector::Name(name) => {
                if !sheet_names.iter().any(|s| s == name) {
                    return Err(KpiError::source_read(
                        path,
                        format!("sheet '{}' not found", name),
                    ));
                }
                name.clone()
            }
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| KpiError::source_read(path, e))?;

        let table = table_from_range(&range, label_rows);
        info!(
            "Loaded sheet '{}': {} rows x {} columns",
            sheet_name,
            table.height(),
            table.width()
        );
        Ok(table)
    }
}

/// Convert a calamine range into a source table.
///
/// Leading columns before the range start are padded so cell positions match
/// sheet columns. The first `label_rows` rows are dropped.
pub fn table_from_range(range: &Range<Data>, label_rows: usize) -> SourceTable {
    let column_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let rows = range
        .rows()
        .skip(label_rows)
        .map(|row| {
            let mut cells = Vec::with_capacity(column_offset + row.len());
            cells.resize(column_offset, Cell::Empty);
            cells.extend(row.iter().map(cell_from_data));
            cells
        })
        .collect();

    SourceTable::new(rows)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_table_from_range_skips_label_rows() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("label".to_string()));
        range.set_value((1, 0), Data::String("июнь".to_string()));
        range.set_value((2, 0), Data::Int(7));
        range.set_value((2, 1), Data::Float(1.5));

        let table = table_from_range(&range, 1);
        assert_eq!(table.height(), 2);
        assert_eq!(table.cell(0, 0), &Cell::Text("июнь".to_string()));
        assert_eq!(table.cell(1, 0), &Cell::Number(7.0));
        assert_eq!(table.cell(1, 1), &Cell::Number(1.5));
        assert_eq!(table.cell(0, 1), &Cell::Empty);
    }

    #[test]
    fn test_table_from_range_pads_leading_columns() {
        let mut range = Range::new((0, 2), (0, 3));
        range.set_value((0, 2), Data::Bool(true));
        range.set_value((0, 3), Data::String("x".to_string()));

        let table = table_from_range(&range, 0);
        assert_eq!(table.width(), 4);
        assert_eq!(table.cell(0, 0), &Cell::Empty);
        assert_eq!(table.cell(0, 2), &Cell::Bool(true));
        assert_eq!(table.cell(0, 3), &Cell::Text("x".to_string()));
    }

    #[test]
    fn test_table_from_empty_range() {
        let range: Range<Data> = Range::empty();
        let table = table_from_range(&range, 1);
        assert_eq!(table.height(), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let path = PathBuf::from("/nonexistent/Данные.xlsx");
        let err = WorkbookLoader::load(&path, &SheetSelector::First, 1).unwrap_err();
        assert_eq!(err.error_code(), "SOURCE_READ_ERROR");
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let err = WorkbookLoader::load(&path, &SheetSelector::First, 1).unwrap_err();
        assert_eq!(err.error_code(), "SOURCE_READ_ERROR");
    }
}
