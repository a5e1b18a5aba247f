//! Cross-sell pipeline - batch training for the vehicle-insurance classifier
//!
//! This crate trains and ships a binary classifier that predicts whether a
//! health-insurance customer will buy vehicle insurance:
//! - Ingestion from MongoDB into timestamped CSV splits
//! - Schema validation with a persisted report
//! - Feature engineering, scaling and SMOTE-ENN rebalancing
//! - Random forest training, evaluation and upload to S3
//!
//! # Modules
//!
//! ## Pipeline
//! - [`components`] - The six stages, one artifact each
//! - [`pipeline`] - Training orchestrator and prediction pipeline
//! - [`entity`] - Stage artifacts and the deployable model bundle
//!
//! ## Core ML Modules
//! - [`preprocessing`] - Gender mapping, one-hot encoding, column scaling
//! - [`synthetic`] - SMOTE, Edited Nearest Neighbours, SMOTE-ENN
//! - [`training`] - Decision tree, random forest, classification metrics
//!
//! ## Infrastructure
//! - [`data_access`] - Document-store sources
//! - [`cloud_storage`] - Model stores (S3, local directory)
//! - [`config`] - Per-stage configuration and schema
//! - [`utils`] - CSV and artifact file helpers
//!
//! ## Services
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod constants;
pub mod config;
pub mod utils;

// Core ML modules
pub mod preprocessing;
pub mod synthetic;
pub mod training;

// Pipeline
pub mod entity;
pub mod components;
pub mod pipeline;

// Infrastructure
pub mod data_access;
pub mod cloud_storage;

// Services
pub mod cli;

pub use error::{ErrorKind, PipelineError, Result};

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{ErrorKind, PipelineError, Result};

    // Configuration
    pub use crate::config::{ConnectionSettings, PipelineConfig, SchemaConfig, TrainingPipelineConfig};

    // Pipelines
    pub use crate::pipeline::{InsuranceData, PipelineRun, PredictionPipeline, TrainPipeline};
    pub use crate::entity::ModelBundle;

    // External services
    pub use crate::data_access::{CsvSource, DocumentSource, MongoSource};
    pub use crate::cloud_storage::{LocalModelStore, ModelStore, S3ModelStore};

    // Models
    pub use crate::preprocessing::Preprocessor;
    pub use crate::synthetic::{Sampler, SMOTE, SMOTEENN};
    pub use crate::training::{ClassificationMetrics, RandomForest};
}
