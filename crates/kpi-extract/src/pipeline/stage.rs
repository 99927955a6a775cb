//! Pipeline stages.
//!
//! A run moves through these stages in declaration order. Observers registered
//! with [`crate::PipelineBuilder::on_stage`] are notified as each one starts.
//! `Loading` and `Writing` only happen in [`crate::Pipeline::run`]; `Writing`
//! is skipped when output is disabled.

use serde::{Deserialize, Serialize};

/// Stages of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Reading the workbook
    Loading,
    /// Selecting the KPI columns
    Slicing,
    /// Checking the header row
    Validating,
    /// Coercing cells to numbers
    Cleaning,
    /// Filling missing values
    Imputing,
    /// Building the output table
    Assembling,
    /// Computing summary statistics
    Reporting,
    /// Writing the CSV
    Writing,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Workbook",
            Self::Slicing => "Slicing KPI Block",
            Self::Validating => "Validating Header",
            Self::Cleaning => "Cleaning Values",
            Self::Imputing => "Imputing Values",
            Self::Assembling => "Assembling Table",
            Self::Reporting => "Reporting",
            Self::Writing => "Writing CSV",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(PipelineStage::Validating.to_string(), "Validating Header");
        assert_eq!(PipelineStage::Writing.display_name(), "Writing CSV");
    }

    #[test]
    fn test_report_precedes_write() {
        assert!(PipelineStage::Loading < PipelineStage::Slicing);
        assert!(PipelineStage::Imputing < PipelineStage::Assembling);
        assert!(PipelineStage::Reporting < PipelineStage::Writing);
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&PipelineStage::Imputing).unwrap();
        assert_eq!(json, "\"Imputing\"");
    }
}
