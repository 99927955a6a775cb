//! Main extraction pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating a run: load → slice → validate → clean → impute → assemble
//! → report → write.

use crate::config::ExtractionConfig;
use crate::error::{KpiError, Result, ResultExt};
use crate::extractor::KpiBlock;
use crate::pipeline::ExtractionExecutor;
use crate::pipeline::stage::PipelineStage;
use crate::reporting::{CsvOutput, SummaryStats};
use crate::source::WorkbookLoader;
use crate::types::{PipelineResult, SourceTable};
use std::time::Instant;
use tracing::{error, info};

type StageObserver = Box<dyn Fn(PipelineStage) + Send + Sync>;

/// The KPI extraction pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use kpi_extract::{ExtractionConfig, Pipeline};
///
/// // Read the workbook, write kpi.csv
/// let result = Pipeline::builder()
///     .config(ExtractionConfig::default())
///     .build()?
///     .run()?;
///
/// // In memory only, no files touched
/// let result = Pipeline::builder()
///     .on_stage(|stage| println!("{}", stage))
///     .build()?
///     .process(&table)?;
/// ```
pub struct Pipeline {
    config: ExtractionConfig,
    stage_observer: Option<StageObserver>,
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Run the full pipeline against the configured workbook.
    ///
    /// Writes the CSV unless `write_output` is disabled. Any failure aborts
    /// the run; schema errors are raised before anything is written.
    pub fn run(&self) -> Result<PipelineResult> {
        let start = Instant::now();
        info!("Starting KPI extraction from {}", self.config.source_path.display());

        let result = self.run_internal();
        match &result {
            Ok(result) => info!(
                "Extraction completed in {} ms ({} rows)",
                start.elapsed().as_millis(),
                result.data.height()
            ),
            Err(e) => error!("Extraction failed: {}", e),
        }
        result
    }

    fn run_internal(&self) -> Result<PipelineResult> {
        self.enter(PipelineStage::Loading);
        let table = WorkbookLoader::load_from_config(&self.config)?;

        let mut result = self.process(&table)?;

        if self.config.write_output {
            self.enter(PipelineStage::Writing);
            let path = CsvOutput::new(&self.config.output_path)
                .atomic(self.config.atomic_write)
                .write(&result.data)?;
            result.output_path = Some(path);
        } else {
            info!("Output writing disabled; keeping results in memory");
        }

        Ok(result)
    }

    /// Process an in-memory source table without touching the filesystem.
    ///
    /// The returned result has no `output_path`.
    pub fn process(&self, table: &SourceTable) -> Result<PipelineResult> {
        self.enter(PipelineStage::Slicing);
        let block = KpiBlock::slice(table, self.config.column_range())
            .context("Slicing KPI block")?;

        self.enter(PipelineStage::Validating);
        block.validate_header(&self.config.expected_header)?;

        let executor = ExtractionExecutor::new(&self.config);

        self.enter(PipelineStage::Cleaning);
        let cleaned = executor.clean_columns(&block)?;

        self.enter(PipelineStage::Imputing);
        let (imputed, columns) = executor.impute_columns(cleaned, &block.header_labels())?;

        self.enter(PipelineStage::Assembling);
        let data = executor.assemble(imputed)?;

        self.enter(PipelineStage::Reporting);
        let summary = SummaryStats::describe(&data)
            .map_err(|e| KpiError::ReportGenerationFailed(e.to_string()))?;

        Ok(PipelineResult {
            data,
            summary,
            columns,
            output_path: None,
        })
    }

    fn enter(&self, stage: PipelineStage) {
        info!("[{}]", stage);
        if let Some(observer) = &self.stage_observer {
            observer(stage);
        }
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<ExtractionConfig>,
    stage_observer: Option<StageObserver>,
}

impl PipelineBuilder {
    /// Set the extraction configuration. Defaults to [`ExtractionConfig::default`].
    pub fn config(mut self, config: ExtractionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Register a callback invoked as each stage starts.
    pub fn on_stage<F>(mut self, observer: F) -> Self
    where
        F: Fn(PipelineStage) + Send + Sync + 'static,
    {
        self.stage_observer = Some(Box::new(observer));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(Pipeline {
            config,
            stage_observer: self.stage_observer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use std::sync::{Arc, Mutex};

    fn small_config() -> ExtractionConfig {
        ExtractionConfig::builder()
            .first_column(1)
            .expected_header(["m1", "m2"])
            .output_columns(["kpi_m1", "kpi_m2"])
            .build()
            .unwrap()
    }

    fn small_table(header: [&str; 2]) -> SourceTable {
        SourceTable::new(vec![
            vec![Cell::from("id"), Cell::from(header[0]), Cell::from(header[1])],
            vec![Cell::from("r1"), Cell::Number(2.0), Cell::from("нет")],
            vec![Cell::from("r2"), Cell::Number(4.0), Cell::Number(8.0)],
        ])
    }

    #[test]
    fn test_process_in_memory() {
        let pipeline = Pipeline::builder().config(small_config()).build().unwrap();
        let result = pipeline.process(&small_table(["m1", "m2"])).unwrap();

        assert_eq!(result.data.shape(), (2, 2));
        assert_eq!(result.summary.rows, 2);
        assert_eq!(result.columns.len(), 2);
        assert!(result.output_path.is_none());
    }

    #[test]
    fn test_stage_order_and_fail_fast() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let pipeline = Pipeline::builder()
            .config(small_config())
            .on_stage(move |stage| sink.lock().unwrap().push(stage))
            .build()
            .unwrap();

        let err = pipeline.process(&small_table(["m2", "m1"])).unwrap_err();
        assert!(err.is_schema_error());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![PipelineStage::Slicing, PipelineStage::Validating]
        );
    }

    #[test]
    fn test_stages_follow_declaration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let pipeline = Pipeline::builder()
            .config(small_config())
            .on_stage(move |stage| sink.lock().unwrap().push(stage))
            .build()
            .unwrap();

        pipeline.process(&small_table(["m1", "m2"])).unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                PipelineStage::Slicing,
                PipelineStage::Validating,
                PipelineStage::Cleaning,
                PipelineStage::Imputing,
                PipelineStage::Assembling,
                PipelineStage::Reporting,
            ]
        );
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = ExtractionConfig::default();
        config.output_columns.pop();

        let err = Pipeline::builder().config(config).build().err().unwrap();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_run_with_missing_source() {
        let config = ExtractionConfig::builder()
            .source_path("/nonexistent/source.xlsx")
            .build()
            .unwrap();
        let err = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .run()
            .unwrap_err();
        assert_eq!(err.error_code(), "SOURCE_READ_ERROR");
    }
}
