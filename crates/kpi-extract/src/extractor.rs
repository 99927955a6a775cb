//! KPI block slicing and header validation.

use crate::error::{Result, SchemaError};
use crate::types::{Cell, SourceTable};
use std::ops::Range;
use tracing::debug;

/// A positional column slice of the source table.
///
/// Row 0 is the header row; rows `1..` are data rows. Borrowed from the
/// source table, nothing is copied.
#[derive(Debug, Clone, Copy)]
pub struct KpiBlock<'a> {
    table: &'a SourceTable,
    columns: (usize, usize),
}

impl<'a> KpiBlock<'a> {
    /// Select the half-open column range `columns` from `table`.
    ///
    /// Fails with [`SchemaError::MissingHeaderRow`] on an empty table and
    /// [`SchemaError::InsufficientColumns`] if the table is narrower than
    /// `columns.end`.
    pub fn slice(table: &'a SourceTable, columns: Range<usize>) -> Result<Self> {
        if table.height() == 0 {
            return Err(SchemaError::MissingHeaderRow.into());
        }

        let width = table.width();
        if width < columns.end {
            return Err(SchemaError::InsufficientColumns {
                required: columns.end,
                found: width,
            }
            .into());
        }

        debug!(
            "KPI block: columns {}..{}, {} data rows",
            columns.start,
            columns.end,
            table.height() - 1
        );

        Ok(Self {
            table,
            columns: (columns.start, columns.end),
        })
    }

    /// Number of columns in the block.
    pub fn width(&self) -> usize {
        self.columns.1 - self.columns.0
    }

    /// Number of data rows (header excluded).
    pub fn data_rows(&self) -> usize {
        self.table.height() - 1
    }

    /// Header row cells rendered as plain text.
    ///
    /// Non-text cells render through their display form so a mismatch
    /// report shows what was actually there.
    pub fn header_labels(&self) -> Vec<String> {
        (self.columns.0..self.columns.1)
            .map(|c| self.table.cell(0, c).to_string())
            .collect()
    }

    /// Check the header row against `expected`, exactly and in order.
    ///
    /// Only text cells can match; a numeric `1` never equals a label `"1"`.
    pub fn validate_header(&self, expected: &[String]) -> Result<()> {
        let matches = expected.len() == self.width()
            && (self.columns.0..self.columns.1)
                .zip(expected)
                .all(|(c, label)| self.table.cell(0, c).as_text() == Some(label.as_str()));

        if matches {
            Ok(())
        } else {
            Err(SchemaError::HeaderMismatch {
                expected: expected.to_vec(),
                found: self.header_labels(),
            }
            .into())
        }
    }

    /// Data cells of the block column at `index` (0-based within the block).
    pub fn column(&self, index: usize) -> impl Iterator<Item = &'a Cell> + use<'a> {
        let table = self.table;
        let column = self.columns.0 + index;
        (1..table.height()).map(move |row| table.cell(row, column))
    }
}
