//! Column cleaning.
//!
//! Turns the raw cells of one KPI column into a Month Series: a `Float64`
//! polars series where every missing entry (sentinel, empty, unparseable) is
//! null. Imputation happens afterwards in [`crate::imputers`].

mod converters;

pub use converters::{CoercedCell, coerce_cell};

use crate::config::InvalidValuePolicy;
use crate::error::{KpiError, Result};
use crate::types::Cell;
use polars::prelude::*;
use tracing::{debug, warn};

/// A cleaned column before imputation, with counts of what was dropped.
#[derive(Debug, Clone)]
pub struct CleanedColumn {
    /// Float64 series; nulls mark missing entries
    pub series: Series,
    pub sentinel_count: usize,
    pub invalid_count: usize,
    pub empty_count: usize,
}

impl CleanedColumn {
    pub fn missing_count(&self) -> usize {
        self.sentinel_count + self.invalid_count + self.empty_count
    }
}

/// Cleans KPI columns according to a sentinel and an invalid-value policy.
#[derive(Debug, Clone, Copy)]
pub struct ColumnCleaner<'a> {
    sentinel: &'a str,
    policy: InvalidValuePolicy,
}

impl<'a> ColumnCleaner<'a> {
    pub fn new(sentinel: &'a str, policy: InvalidValuePolicy) -> Self {
        Self { sentinel, policy }
    }

    /// Coerce `cells` into a Float64 series named `name`.
    ///
    /// Under [`InvalidValuePolicy::Reject`] the first unparseable cell aborts
    /// with [`KpiError::InvalidValue`]; the reported row is 1-based among
    /// data rows.
    pub fn clean<'c>(
        &self,
        name: &str,
        cells: impl IntoIterator<Item = &'c Cell>,
    ) -> Result<CleanedColumn> {
        let mut values: Vec<Option<f64>> = Vec::new();
        let mut sentinel_count = 0;
        let mut invalid_count = 0;
        let mut empty_count = 0;

        for (idx, cell) in cells.into_iter().enumerate() {
            let value = match coerce_cell(cell, self.sentinel) {
                CoercedCell::Value(v) => Some(v),
                CoercedCell::Sentinel => {
                    sentinel_count += 1;
                    None
                }
                CoercedCell::Empty => {
                    empty_count += 1;
                    None
                }
                CoercedCell::Invalid(raw) => match self.policy {
                    InvalidValuePolicy::TreatAsMissing => {
                        debug!("'{}' row {}: {:?} treated as missing", name, idx + 1, raw);
                        invalid_count += 1;
                        None
                    }
                    InvalidValuePolicy::Reject => {
                        return Err(KpiError::InvalidValue {
                            column: name.to_string(),
                            row: idx + 1,
                            value: raw,
                        });
                    }
                },
            };
            values.push(value);
        }

        if invalid_count > 0 {
            warn!(
                "Column '{}': {} unparseable value(s) treated as missing",
                name, invalid_count
            );
        }

        Ok(CleanedColumn {
            series: Series::new(name.into(), values),
            sentinel_count,
            invalid_count,
            empty_count,
        })
    }
}
