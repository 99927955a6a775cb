//! Pipeline module.
//!
//! This module provides the extraction pipeline and its stages.

mod builder;
mod executor;
pub mod stage;

pub use builder::{Pipeline, PipelineBuilder};
pub use executor::ExtractionExecutor;
pub use stage::PipelineStage;
