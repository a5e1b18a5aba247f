//! End-to-end pipelines
//!
//! [`TrainPipeline`] runs every stage in order against one timestamped
//! artifact directory. [`PredictionPipeline`] scores raw rows with the
//! deployed bundle.

mod prediction;
mod training;

pub use prediction::{InsuranceData, PredictionPipeline};
pub use training::{PipelineRun, TrainPipeline};
