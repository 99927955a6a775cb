//! Shared utilities for the extraction pipeline.

use polars::prelude::*;

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Try to parse a cell's text as a numeric value (f64).
///
/// Surrounding whitespace is ignored. Unlike a display formatter this does
/// not strip thousands separators or currency marks: `"1,5"` is not a number.
/// A textual `NaN` parses, but callers treat it as missing like any NaN.
///
/// # Example
///
/// ```rust,ignore
/// use kpi_extract::utils::parse_numeric_string;
///
/// assert_eq!(parse_numeric_string(" 42 "), Some(42.0));
/// assert_eq!(parse_numeric_string("1e3"), Some(1000.0));
/// assert_eq!(parse_numeric_string("нет"), None);
/// ```
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

// =============================================================================
// Statistics Utilities
// =============================================================================

/// Linear-interpolated quantile of an ascending slice.
///
/// Returns NaN for an empty slice.
pub fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns NaN when fewer than two values are given.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

// =============================================================================
// Series Utilities
// =============================================================================

/// Collect the values of a Float64 series that are neither null nor NaN.
pub fn present_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let ca = series.f64()?;
    Ok(ca.into_iter().flatten().filter(|v| !v.is_nan()).collect())
}
