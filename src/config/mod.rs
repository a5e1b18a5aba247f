//! Pipeline configuration
//!
//! One struct per stage, all derived from a single [`TrainingPipelineConfig`]
//! whose timestamp keys the run's artifact directory.

mod schema;

pub use schema::SchemaConfig;

use crate::constants::*;
use crate::error::{PipelineError, Result};
use crate::training::Criterion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Run-level configuration shared by every stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPipelineConfig {
    pub pipeline_name: String,
    /// `<artifact_root>/<timestamp>`
    pub artifact_dir: PathBuf,
    pub timestamp: String,
}

impl TrainingPipelineConfig {
    /// Create a config rooted at `artifact_root`, stamped with the current local time
    pub fn new(artifact_root: impl AsRef<Path>) -> Self {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        Self::with_timestamp(artifact_root, timestamp)
    }

    pub fn with_timestamp(artifact_root: impl AsRef<Path>, timestamp: impl Into<String>) -> Self {
        let timestamp = timestamp.into();
        Self {
            pipeline_name: PIPELINE_NAME.to_string(),
            artifact_dir: artifact_root.as_ref().join(&timestamp),
            timestamp,
        }
    }
}

impl Default for TrainingPipelineConfig {
    fn default() -> Self {
        Self::new(ARTIFACT_DIR)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataIngestionConfig {
    pub data_ingestion_dir: PathBuf,
    pub feature_store_file_path: PathBuf,
    pub training_file_path: PathBuf,
    pub testing_file_path: PathBuf,
    /// Fraction of rows assigned to the test split
    pub train_test_split_ratio: f64,
    pub collection_name: String,
    /// Seed for the row shuffle; `None` draws from entropy
    pub random_state: Option<u64>,
}

impl DataIngestionConfig {
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        let data_ingestion_dir = pipeline.artifact_dir.join(DATA_INGESTION_DIR_NAME);
        let ingested = data_ingestion_dir.join(DATA_INGESTION_INGESTED_DIR);
        Self {
            feature_store_file_path: data_ingestion_dir
                .join(DATA_INGESTION_FEATURE_STORE_DIR)
                .join(FILE_NAME),
            training_file_path: ingested.join(TRAIN_FILE_NAME),
            testing_file_path: ingested.join(TEST_FILE_NAME),
            data_ingestion_dir,
            train_test_split_ratio: DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO,
            collection_name: COLLECTION_NAME.to_string(),
            random_state: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataValidationConfig {
    pub data_validation_dir: PathBuf,
    pub validation_report_file_path: PathBuf,
}

impl DataValidationConfig {
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        let data_validation_dir = pipeline.artifact_dir.join(DATA_VALIDATION_DIR_NAME);
        Self {
            validation_report_file_path: data_validation_dir.join(DATA_VALIDATION_REPORT_FILE_NAME),
            data_validation_dir,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTransformationConfig {
    pub data_transformation_dir: PathBuf,
    pub transformed_train_file_path: PathBuf,
    pub transformed_test_file_path: PathBuf,
    pub transformed_object_file_path: PathBuf,
    pub target_column: String,
    pub smote_k_neighbors: usize,
    pub enn_n_neighbors: usize,
    /// Also rebalance the held-out split. Off by default: resampling test data
    /// changes the class balance the model is scored against.
    pub resample_test_split: bool,
    /// Seed for SMOTE interpolation; `None` draws from entropy
    pub random_state: Option<u64>,
}

impl DataTransformationConfig {
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        let data_transformation_dir = pipeline.artifact_dir.join(DATA_TRANSFORMATION_DIR_NAME);
        let transformed = data_transformation_dir.join(DATA_TRANSFORMATION_TRANSFORMED_DATA_DIR);
        Self {
            transformed_train_file_path: transformed.join(TRANSFORMED_TRAIN_FILE_NAME),
            transformed_test_file_path: transformed.join(TRANSFORMED_TEST_FILE_NAME),
            transformed_object_file_path: data_transformation_dir
                .join(DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR)
                .join(PREPROCESSING_OBJECT_FILE_NAME),
            data_transformation_dir,
            target_column: TARGET_COLUMN.to_string(),
            smote_k_neighbors: SMOTE_K_NEIGHBORS,
            enn_n_neighbors: ENN_N_NEIGHBORS,
            resample_test_split: false,
            random_state: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTrainerConfig {
    pub model_trainer_dir: PathBuf,
    pub trained_model_file_path: PathBuf,
    /// Minimum training accuracy for the model to be kept
    pub expected_accuracy: f64,
    pub n_estimators: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_depth: usize,
    pub criterion: Criterion,
    pub random_state: u64,
}

impl ModelTrainerConfig {
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        let model_trainer_dir = pipeline.artifact_dir.join(MODEL_TRAINER_DIR_NAME);
        Self {
            trained_model_file_path: model_trainer_dir
                .join(MODEL_TRAINER_TRAINED_MODEL_DIR)
                .join(MODEL_FILE_NAME),
            model_trainer_dir,
            expected_accuracy: MODEL_TRAINER_EXPECTED_SCORE,
            n_estimators: MODEL_TRAINER_N_ESTIMATORS,
            min_samples_split: MODEL_TRAINER_MIN_SAMPLES_SPLIT,
            min_samples_leaf: MODEL_TRAINER_MIN_SAMPLES_LEAF,
            max_depth: MODEL_TRAINER_MAX_DEPTH,
            criterion: Criterion::Entropy,
            random_state: MODEL_TRAINER_RANDOM_STATE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEvaluationConfig {
    /// Minimum F1 improvement over the deployed bundle
    pub changed_threshold_score: f64,
    pub bucket_name: String,
    pub s3_model_key_path: String,
    pub target_column: String,
}

impl Default for ModelEvaluationConfig {
    fn default() -> Self {
        Self {
            changed_threshold_score: MODEL_EVALUATION_CHANGED_THRESHOLD_SCORE,
            bucket_name: MODEL_BUCKET_NAME.to_string(),
            s3_model_key_path: MODEL_FILE_NAME.to_string(),
            target_column: TARGET_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPusherConfig {
    pub bucket_name: String,
    pub s3_model_key_path: String,
}

impl Default for ModelPusherConfig {
    fn default() -> Self {
        Self {
            bucket_name: MODEL_BUCKET_NAME.to_string(),
            s3_model_key_path: MODEL_FILE_NAME.to_string(),
        }
    }
}

/// Where the prediction pipeline finds the deployed bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub model_bucket_name: String,
    pub model_file_path: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_bucket_name: MODEL_BUCKET_NAME.to_string(),
            model_file_path: MODEL_FILE_NAME.to_string(),
        }
    }
}

/// Every stage configuration for one run, built once at pipeline construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub training_pipeline: TrainingPipelineConfig,
    pub data_ingestion: DataIngestionConfig,
    pub data_validation: DataValidationConfig,
    pub data_transformation: DataTransformationConfig,
    pub model_trainer: ModelTrainerConfig,
    pub model_evaluation: ModelEvaluationConfig,
    pub model_pusher: ModelPusherConfig,
}

impl PipelineConfig {
    pub fn new(training_pipeline: TrainingPipelineConfig) -> Self {
        Self {
            data_ingestion: DataIngestionConfig::new(&training_pipeline),
            data_validation: DataValidationConfig::new(&training_pipeline),
            data_transformation: DataTransformationConfig::new(&training_pipeline),
            model_trainer: ModelTrainerConfig::new(&training_pipeline),
            model_evaluation: ModelEvaluationConfig::default(),
            model_pusher: ModelPusherConfig::default(),
            training_pipeline,
        }
    }

    /// Seed every random step of the run
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.data_ingestion.random_state = Some(seed);
        self.data_transformation.random_state = Some(seed);
        self
    }
}

/// Connection settings read from the environment
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub mongodb_url: String,
    pub database_name: String,
    pub server_selection_timeout: Duration,
    pub aws_region: String,
}

impl ConnectionSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        let mongodb_url = std::env::var(MONGODB_URL_KEY).map_err(|_| {
            PipelineError::config(format!("Environment variable '{}' is not set.", MONGODB_URL_KEY))
        })?;

        Ok(Self {
            mongodb_url,
            database_name: DATABASE_NAME.to_string(),
            server_selection_timeout: Duration::from_secs(MONGODB_SERVER_SELECTION_TIMEOUT_SECS),
            aws_region: Self::aws_region_from_env(),
        })
    }

    /// Region for the object store, `us-east-1` unless overridden
    pub fn aws_region_from_env() -> String {
        std::env::var(AWS_REGION_ENV_KEY).unwrap_or_else(|_| REGION_NAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_paths_share_timestamp() {
        let pipeline = TrainingPipelineConfig::with_timestamp("artifact", "01_02_2026_03_04_05");
        let config = PipelineConfig::new(pipeline);

        let root = Path::new("artifact").join("01_02_2026_03_04_05");
        assert!(config.data_ingestion.training_file_path.starts_with(&root));
        assert!(config.data_validation.validation_report_file_path.starts_with(&root));
        assert!(config.data_transformation.transformed_object_file_path.starts_with(&root));
        assert!(config.model_trainer.trained_model_file_path.starts_with(&root));
    }

    #[test]
    fn test_layout() {
        let pipeline = TrainingPipelineConfig::with_timestamp("a", "ts");
        let ingestion = DataIngestionConfig::new(&pipeline);
        assert_eq!(
            ingestion.feature_store_file_path,
            Path::new("a/ts/data_ingestion/feature_store/data.csv")
        );
        assert_eq!(ingestion.testing_file_path, Path::new("a/ts/data_ingestion/ingested/test.csv"));

        let validation = DataValidationConfig::new(&pipeline);
        assert_eq!(
            validation.validation_report_file_path,
            Path::new("a/ts/data_validation/report.yaml")
        );

        let trainer = ModelTrainerConfig::new(&pipeline);
        assert_eq!(
            trainer.trained_model_file_path,
            Path::new("a/ts/model_trainer/trained_model/model.bin")
        );
        assert_eq!(trainer.n_estimators, 20);
        assert_eq!(trainer.criterion, Criterion::Entropy);
    }

    #[test]
    fn test_timestamp_format() {
        let pipeline = TrainingPipelineConfig::new("artifact");
        // mm_dd_YYYY_HH_MM_SS
        assert_eq!(pipeline.timestamp.len(), 19);
        assert_eq!(pipeline.timestamp.matches('_').count(), 5);
    }
}
