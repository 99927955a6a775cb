//! Extraction executor module.
//!
//! Contains the per-column cleaning and imputation logic and the assembly of
//! the output table, one method per pipeline stage.

use crate::cleaner::{CleanedColumn, ColumnCleaner};
use crate::config::ExtractionConfig;
use crate::error::{KpiError, Result, ResultExt};
use crate::extractor::KpiBlock;
use crate::imputers::StatisticalImputer;
use crate::types::ColumnReport;
use polars::prelude::*;
use tracing::{debug, info};

/// Executes the clean, impute and assemble steps over a validated KPI block.
pub struct ExtractionExecutor<'a> {
    config: &'a ExtractionConfig,
}

impl<'a> ExtractionExecutor<'a> {
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self { config }
    }

    /// Coerce every block column into a Month Series, in output order.
    pub fn clean_columns(&self, block: &KpiBlock<'_>) -> Result<Vec<CleanedColumn>> {
        let cleaner = ColumnCleaner::new(&self.config.sentinel, self.config.invalid_value_policy);

        self.config
            .output_columns
            .iter()
            .enumerate()
            .map(|(idx, name)| -> Result<CleanedColumn> {
                let cleaned = cleaner.clean(name, block.column(idx))?;
                debug!(
                    "Cleaned '{}': {} sentinel, {} invalid, {} empty",
                    name, cleaned.sentinel_count, cleaned.invalid_count, cleaned.empty_count
                );
                Ok(cleaned)
            })
            .collect()
    }

    /// Fill each column with its mean.
    ///
    /// `labels` are the header labels of the block, used in the column reports.
    pub fn impute_columns(
        &self,
        cleaned: Vec<CleanedColumn>,
        labels: &[String],
    ) -> Result<(Vec<Column>, Vec<ColumnReport>)> {
        let mut columns: Vec<Column> = Vec::with_capacity(cleaned.len());
        let mut reports = Vec::with_capacity(cleaned.len());

        for (idx, cleaned) in cleaned.into_iter().enumerate() {
            let name = cleaned.series.name().to_string();
            let imputed = StatisticalImputer::apply_numeric_mean(&cleaned.series).map_err(|e| {
                KpiError::ImputationFailed {
                    column: name.clone(),
                    reason: e.to_string(),
                }
            })?;

            if imputed.filled > 0 {
                info!(
                    "Filled {} missing value(s) in '{}' with mean {:.4}",
                    imputed.filled, name, imputed.fill_value
                );
            }

            reports.push(ColumnReport {
                name,
                source_label: labels.get(idx).cloned().unwrap_or_default(),
                rows: imputed.series.len(),
                sentinel_count: cleaned.sentinel_count,
                invalid_count: cleaned.invalid_count,
                empty_count: cleaned.empty_count,
                fill_value: (!imputed.fill_value.is_nan()).then_some(imputed.fill_value),
            });
            columns.push(Column::from(imputed.series));
        }

        Ok((columns, reports))
    }

    /// Assemble imputed columns into the output table, in order.
    pub fn assemble(&self, columns: Vec<Column>) -> Result<DataFrame> {
        let df = DataFrame::new(columns).context("Assembling output table")?;
        debug!("Assembled output table: {} rows x {} columns", df.height(), df.width());
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, SourceTable};

    fn table() -> SourceTable {
        let header = ["a", "b"].iter().map(|s| Cell::from(*s)).collect();
        SourceTable::new(vec![
            header,
            vec![Cell::Number(1.0), Cell::from("нет")],
            vec![Cell::from("x"), Cell::Number(4.0)],
            vec![Cell::Number(3.0), Cell::Number(6.0)],
        ])
    }

    fn config() -> ExtractionConfig {
        ExtractionConfig::builder()
            .first_column(0)
            .expected_header(["a", "b"])
            .output_columns(["kpi_a", "kpi_b"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_clean_impute_assemble() {
        let table = table();
        let config = config();
        let block = KpiBlock::slice(&table, config.column_range()).unwrap();
        let executor = ExtractionExecutor::new(&config);

        let cleaned = executor.clean_columns(&block).unwrap();
        assert_eq!(cleaned.len(), 2);

        let (columns, reports) = executor
            .impute_columns(cleaned, &block.header_labels())
            .unwrap();
        let df = executor.assemble(columns).unwrap();

        assert_eq!(df.shape(), (3, 2));
        let a: Vec<f64> = df.column("kpi_a").unwrap().f64().unwrap().into_no_null_iter().collect();
        let b: Vec<f64> = df.column("kpi_b").unwrap().f64().unwrap().into_no_null_iter().collect();
        assert_eq!(a, vec![1.0, 2.0, 3.0]);
        assert_eq!(b, vec![5.0, 4.0, 6.0]);

        assert_eq!(reports[0].source_label, "a");
        assert_eq!(reports[0].invalid_count, 1);
        assert_eq!(reports[0].fill_value, Some(2.0));
        assert_eq!(reports[1].sentinel_count, 1);
        assert_eq!(reports[1].fill_value, Some(5.0));
    }

    #[test]
    fn test_fully_missing_column_reports_no_fill_value() {
        let table = SourceTable::new(vec![
            vec![Cell::from("a"), Cell::from("b")],
            vec![Cell::from("нет"), Cell::Number(1.0)],
        ]);
        let config = config();
        let block = KpiBlock::slice(&table, config.column_range()).unwrap();
        let executor = ExtractionExecutor::new(&config);

        let cleaned = executor.clean_columns(&block).unwrap();
        let (columns, reports) = executor.impute_columns(cleaned, &[]).unwrap();
        let df = executor.assemble(columns).unwrap();

        assert_eq!(reports[0].fill_value, None);
        assert_eq!(reports[0].source_label, "");
        let a = df.column("kpi_a").unwrap().f64().unwrap().get(0).unwrap();
        assert!(a.is_nan());
    }
}
