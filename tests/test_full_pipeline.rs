//! Integration tests for the training pipeline: ingestion through push

use crosssell_pipeline::cloud_storage::{LocalModelStore, ModelStore};
use crosssell_pipeline::config::{PipelineConfig, PredictorConfig, SchemaConfig, TrainingPipelineConfig};
use crosssell_pipeline::data_access::DocumentSource;
use crosssell_pipeline::error::{ErrorKind, Result};
use crosssell_pipeline::pipeline::{PredictionPipeline, TrainPipeline};
use crosssell_pipeline::preprocessing::{split_label, Preprocessor};
use crosssell_pipeline::utils::{load_array, load_object, read_csv};
use polars::prelude::*;
use std::path::Path;

const SCHEMA: &str = r#"
columns:
  - id: int
  - Gender: category
  - Age: int
  - Vehicle_Damage: category
  - Annual_Premium: float
  - Response: int
numerical_columns: [id, Age, Annual_Premium, Response]
categorical_columns: [Gender, Vehicle_Damage]
drop_columns: id
num_features: [Age]
mm_columns: [Annual_Premium]
"#;

struct MemorySource(DataFrame);

impl DocumentSource for MemorySource {
    fn export_collection(&self, _collection: &str) -> Result<DataFrame> {
        Ok(self.0.clone())
    }
}

/// 100 customers, 40 interested, separable on age, damage and premium
fn customers() -> DataFrame {
    let n = 100;
    let positive = |i: usize| i < 40;

    let gender: Vec<&str> = (0..n).map(|i| if i % 3 == 0 { "Female" } else { "Male" }).collect();
    let age: Vec<i64> = (0..n)
        .map(|i| if positive(i) { 50 + (i % 20) as i64 } else { 20 + (i % 20) as i64 })
        .collect();
    let damage: Vec<&str> = (0..n)
        .map(|i| if positive(i) { "Yes" } else { "No" })
        .collect();
    let premium: Vec<f64> = (0..n)
        .map(|i| {
            let base = if positive(i) { 30_000.0 } else { 20_000.0 };
            base + (i % 10) as f64 * 900.0
        })
        .collect();
    let response: Vec<i64> = (0..n).map(|i| i64::from(positive(i))).collect();
    let id: Vec<i64> = (0..n).map(|i| 1000 + i as i64).collect();

    df!(
        "id" => id,
        "Gender" => gender,
        "Age" => age,
        "Vehicle_Damage" => damage,
        "Annual_Premium" => premium,
        "Response" => response
    )
    .unwrap()
}

fn pipeline_config(root: &Path, timestamp: &str) -> PipelineConfig {
    PipelineConfig::new(TrainingPipelineConfig::with_timestamp(root.join("artifact"), timestamp))
        .with_random_state(7)
}

fn pipeline(config: PipelineConfig, df: DataFrame, store_root: &Path) -> TrainPipeline {
    TrainPipeline::new(
        config,
        SchemaConfig::from_yaml_str(SCHEMA).unwrap(),
        Box::new(MemorySource(df)),
        Box::new(LocalModelStore::new(store_root)),
    )
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_end_to_end_run_pushes_first_model() {
    let dir = tempfile::tempdir().unwrap();
    let store_root = dir.path().join("store");
    let config = pipeline_config(dir.path(), "01_01_2026_00_00_00");

    let run = pipeline(config.clone(), customers(), &store_root).run_pipeline().unwrap();

    // ceil(0.25 * 100) rows held out
    assert_eq!(read_csv(&run.ingestion.trained_file_path).unwrap().height(), 75);
    assert_eq!(read_csv(&run.ingestion.test_file_path).unwrap().height(), 25);
    assert!(config.data_ingestion.feature_store_file_path.is_file());

    assert!(run.validation.validation_status);
    assert_eq!(run.validation.message, "");
    assert!(run.validation.validation_report_file_path.is_file());

    // identifier dropped: Age, Annual_Premium, Gender, Vehicle_Damage_Yes, label
    let preprocessor: Preprocessor =
        load_object(&run.transformation.transformed_object_file_path).unwrap();
    assert!(!preprocessor.feature_names().contains(&"id".to_string()));
    let train = load_array(&run.transformation.transformed_train_file_path).unwrap();
    let test = load_array(&run.transformation.transformed_test_file_path).unwrap();
    assert_eq!(train.ncols(), 5);
    assert_eq!(test.ncols(), 5);
    assert_eq!(test.nrows(), 25, "test split is not resampled by default");

    let (_, y) = split_label(&train).unwrap();
    let positives = y.iter().filter(|&&label| label == 1).count();
    assert_eq!(positives * 2, y.len(), "train classes should be balanced");

    assert!(run.trainer.metric_artifact.accuracy_score >= 0.6);
    assert!(run.trainer.trained_model_file_path.is_file());

    assert!(run.evaluation.is_model_accepted);
    assert_eq!(run.evaluation.deployed_model_score, None);

    let pushed = run.pusher.expect("first model is always pushed");
    let store = LocalModelStore::new(&store_root);
    assert!(store.is_model_present(&pushed.bucket_name, &pushed.s3_model_path).unwrap());

    for path in [
        &run.ingestion.trained_file_path,
        &run.transformation.transformed_object_file_path,
        &run.trainer.trained_model_file_path,
    ] {
        assert!(path.starts_with(dir.path().join("artifact").join("01_01_2026_00_00_00")));
    }
}

#[test]
fn test_identical_rerun_is_not_pushed() {
    let dir = tempfile::tempdir().unwrap();
    let store_root = dir.path().join("store");

    let first = pipeline(pipeline_config(dir.path(), "run_a"), customers(), &store_root)
        .run_pipeline()
        .unwrap();
    assert!(first.pusher.is_some());

    let second = pipeline(pipeline_config(dir.path(), "run_b"), customers(), &store_root)
        .run_pipeline()
        .unwrap();
    assert!(!second.evaluation.is_model_accepted);
    assert_eq!(second.evaluation.deployed_model_score, Some(second.evaluation.trained_model_score));
    assert_eq!(second.evaluation.changed_accuracy, 0.0);
    assert!(second.pusher.is_none());
}

#[test]
fn test_prediction_pipeline_uses_deployed_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let store_root = dir.path().join("store");
    pipeline(pipeline_config(dir.path(), "ts"), customers(), &store_root)
        .run_pipeline()
        .unwrap();

    let rows = df!(
        "Gender" => ["Male", "Female"],
        "Age" => [62i64, 24],
        "Vehicle_Damage" => ["Yes", "No"],
        "Annual_Premium" => [35_000.0, 21_000.0]
    )
    .unwrap();

    let predictor = PredictionPipeline::new(
        PredictorConfig::default(),
        Box::new(LocalModelStore::new(&store_root)),
    );
    assert_eq!(predictor.predict(&rows).unwrap(), vec![1, 0]);

    // an identifier column on incoming rows is dropped before scoring
    let mut with_id = rows.clone();
    with_id.with_column(Series::new("id".into(), [7i64, 8])).unwrap();
    assert_eq!(predictor.predict(&with_id).unwrap(), vec![1, 0]);
}

#[test]
fn test_resampled_test_split_is_balanced() {
    let dir = tempfile::tempdir().unwrap();
    let store_root = dir.path().join("store");
    let mut config = pipeline_config(dir.path(), "ts");
    config.data_transformation.resample_test_split = true;

    let run = pipeline(config, customers(), &store_root).run_pipeline().unwrap();

    let test = load_array(&run.transformation.transformed_test_file_path).unwrap();
    let (_, y) = split_label(&test).unwrap();
    let positives = y.iter().filter(|&&label| label == 1).count();
    assert!(y.len() > 25, "minority rows are synthesised");
    assert_eq!(positives * 2, y.len(), "test classes should be balanced");
}

// ============================================================================
// Stage failures
// ============================================================================

#[test]
fn test_missing_column_stops_at_transformation() {
    let dir = tempfile::tempdir().unwrap();
    let store_root = dir.path().join("store");
    let config = pipeline_config(dir.path(), "ts");
    let df = customers().drop("Vehicle_Damage").unwrap();

    let err = pipeline(config.clone(), df, &store_root).run_pipeline().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataQuality);
    assert!(err.to_string().contains("Columns are missing in training dataframe."));

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(&config.data_validation.validation_report_file_path).unwrap(),
    )
    .unwrap();
    assert_eq!(report["validation_status"], false);
    assert!(!config.data_transformation.transformed_train_file_path.exists());
}

#[test]
fn test_unknown_gender_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store_root = dir.path().join("store");
    let mut df = customers();
    let gender: Vec<&str> = (0..100).map(|i| if i % 5 == 0 { "Unknown" } else { "Male" }).collect();
    df.with_column(Series::new("Gender".into(), gender)).unwrap();

    let err = pipeline(pipeline_config(dir.path(), "ts"), df, &store_root)
        .run_pipeline()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataQuality);
    assert!(err.to_string().contains("Unknown"));
}

#[test]
fn test_accuracy_floor_rejects_model() {
    let dir = tempfile::tempdir().unwrap();
    let store_root = dir.path().join("store");
    let mut config = pipeline_config(dir.path(), "ts");
    config.model_trainer.expected_accuracy = 1.5;

    let err = pipeline(config.clone(), customers(), &store_root).run_pipeline().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelQuality);
    assert!(!config.model_trainer.trained_model_file_path.exists());

    let store = LocalModelStore::new(&store_root);
    assert!(!store
        .is_model_present(&config.model_pusher.bucket_name, &config.model_pusher.s3_model_key_path)
        .unwrap());
}
