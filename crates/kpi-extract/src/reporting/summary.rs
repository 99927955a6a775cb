//! Descriptive statistics of the output table.

use crate::utils::{present_values, quantile_sorted, sample_std};
use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row labels of the rendered summary, matching pandas `describe`.
pub const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Statistics of one output column.
///
/// `count` excludes NaN entries; every other statistic is computed over the
/// counted values and is NaN when there are none (std also needs two).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarize a numeric series.
    pub fn from_series(series: &Series) -> Result<Self> {
        let mut values = present_values(&series.cast(&DataType::Float64)?)?;
        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = if count == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / count as f64
        };

        Ok(Self {
            name: series.name().to_string(),
            count,
            mean,
            std: sample_std(&values),
            min: values.first().copied().unwrap_or(f64::NAN),
            q25: quantile_sorted(&values, 0.25),
            median: quantile_sorted(&values, 0.5),
            q75: quantile_sorted(&values, 0.75),
            max: values.last().copied().unwrap_or(f64::NAN),
        })
    }

    /// Statistics in [`STAT_LABELS`] order.
    fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Per-column statistics of the output table, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SummaryStats {
    /// Number of rows in the output table
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl SummaryStats {
    /// Describe every column of `df`.
    pub fn describe(df: &DataFrame) -> Result<Self> {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnSummary::from_series(col.as_materialized_series()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rows: df.height(),
            columns,
        })
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Renders a statistics-by-column table, one row per statistic.
impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| c.name.chars().count().max(12))
            .collect();

        write!(f, "{:<6}", "")?;
        for (col, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", col.name, width = *width)?;
        }
        writeln!(f)?;

        let values: Vec<[f64; 8]> = self.columns.iter().map(ColumnSummary::values).collect();
        for (stat, label) in STAT_LABELS.iter().enumerate() {
            write!(f, "{:<6}", label)?;
            for (col, width) in values.iter().zip(&widths) {
                write!(f, "  {:>width$}", format_stat(col[stat]), width = *width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", value)
    }
}
