//! Statistical imputation methods.
//!
//! Provides mean imputation for cleaned KPI columns.

use crate::utils::present_values;
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, warn};

/// A column after imputation.
#[derive(Debug, Clone)]
pub struct ImputedColumn {
    /// Float64 series without nulls
    pub series: Series,
    /// Mean used as the fill value; NaN when the column had no valid values
    pub fill_value: f64,
    /// Number of entries that were filled
    pub filled: usize,
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Arithmetic mean of the non-missing values of a series, or NaN if
    /// there are none.
    pub fn column_mean(series: &Series) -> Result<f64> {
        let values = present_values(&series.cast(&DataType::Float64)?)?;
        if values.is_empty() {
            return Ok(f64::NAN);
        }
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Replace every missing entry with the column mean.
    ///
    /// The mean is computed from the values present before imputation. A
    /// column with no valid values is filled with NaN rather than failing.
    /// The result is explicitly cast to Float64.
    pub fn apply_numeric_mean(series: &Series) -> Result<ImputedColumn> {
        let name = series.name().clone();
        let floats = series.cast(&DataType::Float64)?;
        let mean = Self::column_mean(&floats)?;

        if mean.is_nan() {
            warn!("Column '{}' has no valid values; filling with NaN", name);
        }

        let ca = floats.f64()?;
        let mut filled = 0;
        let values: Vec<f64> = ca
            .into_iter()
            .map(|v| match v {
                Some(v) if !v.is_nan() => v,
                _ => {
                    filled += 1;
                    mean
                }
            })
            .collect();

        debug!("Filled {} value(s) in '{}' with mean {:.4}", filled, name, mean);

        let series = Series::new(name, values).cast(&DataType::Float64)?;
        Ok(ImputedColumn {
            series,
            fill_value: mean,
            filled,
        })
    }
}
