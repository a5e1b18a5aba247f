//! Stage artifacts
//!
//! Each stage returns one of these once its files are on disk. Artifacts are
//! read-only to the stages that receive them.

use crate::training::ClassificationMetrics;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataIngestionArtifact {
    pub trained_file_path: PathBuf,
    pub test_file_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidationArtifact {
    pub validation_status: bool,
    pub message: String,
    pub validation_report_file_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransformationArtifact {
    pub transformed_object_file_path: PathBuf,
    pub transformed_train_file_path: PathBuf,
    pub transformed_test_file_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetricArtifact {
    pub f1_score: f64,
    pub precision_score: f64,
    pub recall_score: f64,
    pub accuracy_score: f64,
}

impl From<ClassificationMetrics> for ClassificationMetricArtifact {
    fn from(m: ClassificationMetrics) -> Self {
        Self {
            f1_score: m.f1_score,
            precision_score: m.precision,
            recall_score: m.recall,
            accuracy_score: m.accuracy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTrainerArtifact {
    pub trained_model_file_path: PathBuf,
    pub metric_artifact: ClassificationMetricArtifact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluationArtifact {
    pub is_model_accepted: bool,
    /// Trained F1 minus deployed F1 (deployed counts as 0 when absent)
    pub changed_accuracy: f64,
    pub trained_model_score: f64,
    pub deployed_model_score: Option<f64>,
    pub s3_model_path: String,
    pub trained_model_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPusherArtifact {
    pub bucket_name: String,
    pub s3_model_path: String,
}
