//! Imputation module for handling missing values.
//!
//! KPI columns are filled with their arithmetic mean; see
//! [`StatisticalImputer::apply_numeric_mean`].

mod statistical;

pub use statistical::{ImputedColumn, StatisticalImputer};
