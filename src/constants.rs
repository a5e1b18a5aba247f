//! Static pipeline constants
//!
//! These seed the per-stage configuration structs in [`crate::config`]; stage
//! logic never reads them directly.

// Document store
pub const DATABASE_NAME: &str = "Proj1";
pub const COLLECTION_NAME: &str = "Proj1-data";
pub const MONGODB_URL_KEY: &str = "MONGODB_URL";
pub const MONGODB_SERVER_SELECTION_TIMEOUT_SECS: u64 = 100;

// Artifact layout
pub const PIPELINE_NAME: &str = "";
pub const ARTIFACT_DIR: &str = "artifact";
pub const TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";

pub const TARGET_COLUMN: &str = "Response";
pub const SCHEMA_FILE_PATH: &str = "config/schema.yaml";

pub const FILE_NAME: &str = "data.csv";
pub const TRAIN_FILE_NAME: &str = "train.csv";
pub const TEST_FILE_NAME: &str = "test.csv";
pub const TRANSFORMED_TRAIN_FILE_NAME: &str = "train.bin";
pub const TRANSFORMED_TEST_FILE_NAME: &str = "test.bin";
pub const PREPROCESSING_OBJECT_FILE_NAME: &str = "preprocessing.bin";
pub const MODEL_FILE_NAME: &str = "model.bin";

// Cloud storage
pub const AWS_REGION_ENV_KEY: &str = "AWS_REGION";
pub const REGION_NAME: &str = "us-east-1";
pub const MODEL_BUCKET_NAME: &str = "my-model-mlopsproj14";

// Data ingestion
pub const DATA_INGESTION_DIR_NAME: &str = "data_ingestion";
pub const DATA_INGESTION_FEATURE_STORE_DIR: &str = "feature_store";
pub const DATA_INGESTION_INGESTED_DIR: &str = "ingested";
pub const DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO: f64 = 0.25;

// Data validation
pub const DATA_VALIDATION_DIR_NAME: &str = "data_validation";
pub const DATA_VALIDATION_REPORT_FILE_NAME: &str = "report.yaml";

// Data transformation
pub const DATA_TRANSFORMATION_DIR_NAME: &str = "data_transformation";
pub const DATA_TRANSFORMATION_TRANSFORMED_DATA_DIR: &str = "transformed";
pub const DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR: &str = "transformed_object";
pub const SMOTE_K_NEIGHBORS: usize = 5;
pub const ENN_N_NEIGHBORS: usize = 3;

// Model trainer
pub const MODEL_TRAINER_DIR_NAME: &str = "model_trainer";
pub const MODEL_TRAINER_TRAINED_MODEL_DIR: &str = "trained_model";
pub const MODEL_TRAINER_EXPECTED_SCORE: f64 = 0.6;
pub const MODEL_TRAINER_N_ESTIMATORS: usize = 20;
pub const MODEL_TRAINER_MIN_SAMPLES_SPLIT: usize = 7;
pub const MODEL_TRAINER_MIN_SAMPLES_LEAF: usize = 6;
pub const MODEL_TRAINER_MAX_DEPTH: usize = 10;
pub const MODEL_TRAINER_RANDOM_STATE: u64 = 101;

// Model evaluation
pub const MODEL_EVALUATION_CHANGED_THRESHOLD_SCORE: f64 = 0.02;
