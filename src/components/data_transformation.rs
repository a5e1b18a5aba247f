//! Feature engineering, scaling and class rebalancing

use crate::config::{DataTransformationConfig, SchemaConfig};
use crate::entity::{DataIngestionArtifact, DataTransformationArtifact, DataValidationArtifact};
use crate::error::{PipelineError, Result};
use crate::preprocessing::{append_label, split_target, Preprocessor};
use crate::synthetic::{EditedNearestNeighbours, Sampler, SMOTE, SMOTEENN};
use crate::utils::{read_csv, save_array, save_object};
use ndarray::{Array1, Array2};

pub struct DataTransformation<'a> {
    ingestion_artifact: &'a DataIngestionArtifact,
    validation_artifact: &'a DataValidationArtifact,
    config: &'a DataTransformationConfig,
    schema: &'a SchemaConfig,
}

impl<'a> DataTransformation<'a> {
    pub fn new(
        ingestion_artifact: &'a DataIngestionArtifact,
        validation_artifact: &'a DataValidationArtifact,
        config: &'a DataTransformationConfig,
        schema: &'a SchemaConfig,
    ) -> Self {
        Self {
            ingestion_artifact,
            validation_artifact,
            config,
            schema,
        }
    }

    fn sampler(&self) -> SMOTEENN {
        let mut smote = SMOTE::new().with_k_neighbors(self.config.smote_k_neighbors);
        if let Some(seed) = self.config.random_state {
            smote = smote.with_seed(seed);
        }
        SMOTEENN::new(
            smote,
            EditedNearestNeighbours::new().with_n_neighbors(self.config.enn_n_neighbors),
        )
    }

    fn resample(&self, x: Array2<f64>, y: Array1<i64>) -> Result<(Array2<f64>, Array1<i64>)> {
        let result = self.sampler().fit_resample(&x, &y)?;
        Ok((result.x, result.y))
    }

    pub fn initiate_data_transformation(&self) -> Result<DataTransformationArtifact> {
        tracing::info!("starting data transformation");

        if !self.validation_artifact.validation_status {
            return Err(PipelineError::data_quality(self.validation_artifact.message.trim()));
        }

        let train = read_csv(&self.ingestion_artifact.trained_file_path)?;
        let test = read_csv(&self.ingestion_artifact.test_file_path)?;

        let (train_features, train_labels) = split_target(&train, &self.config.target_column)?;
        let (test_features, test_labels) = split_target(&test, &self.config.target_column)?;

        let mut preprocessor = Preprocessor::from_schema(self.schema);
        let train_x = preprocessor.fit_transform(&train_features)?;
        let test_x = preprocessor.transform(&test_features)?;
        tracing::info!(
            features = ?preprocessor.feature_names(),
            train_rows = train_x.nrows(),
            test_rows = test_x.nrows(),
            "preprocessor fitted"
        );

        let (train_x, train_y) = self.resample(train_x, train_labels)?;
        let (test_x, test_y) = if self.config.resample_test_split {
            self.resample(test_x, test_labels)?
        } else {
            (test_x, test_labels)
        };

        let train_arr = append_label(&train_x, &train_y)?;
        let test_arr = append_label(&test_x, &test_y)?;

        save_object(&self.config.transformed_object_file_path, &preprocessor)?;
        save_array(&self.config.transformed_train_file_path, &train_arr)?;
        save_array(&self.config.transformed_test_file_path, &test_arr)?;

        let artifact = DataTransformationArtifact {
            transformed_object_file_path: self.config.transformed_object_file_path.clone(),
            transformed_train_file_path: self.config.transformed_train_file_path.clone(),
            transformed_test_file_path: self.config.transformed_test_file_path.clone(),
        };
        tracing::info!(?artifact, "data transformation complete");
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingPipelineConfig;
    use crate::error::ErrorKind;
    use crate::utils::{load_array, load_object};

    const SCHEMA: &str = r#"
columns:
  - id: int
  - Gender: category
  - Age: int
  - Vehicle_Damage: category
  - Response: int
numerical_columns: [id, Age, Response]
categorical_columns: [Gender, Vehicle_Damage]
drop_columns: id
num_features: [Age]
mm_columns: []
"#;

    fn write_split(path: &std::path::Path, rows: usize, offset: usize) {
        let mut csv = String::from("id,Gender,Age,Vehicle_Damage,Response\n");
        for i in 0..rows {
            let positive = i % 4 == 0;
            let gender = if i % 2 == 0 { "Male" } else { "Female" };
            let age = if positive { 60 + i % 7 } else { 20 + i % 9 };
            let damage = if positive { "Yes" } else { "No" };
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                offset + i,
                gender,
                age,
                damage,
                u8::from(positive)
            ));
        }
        std::fs::write(path, csv).unwrap();
    }

    fn setup(dir: &std::path::Path) -> (DataIngestionArtifact, DataTransformationConfig) {
        let train = dir.join("train.csv");
        let test = dir.join("test.csv");
        write_split(&train, 40, 0);
        write_split(&test, 12, 100);

        let pipeline = TrainingPipelineConfig::with_timestamp(dir, "ts");
        let mut config = DataTransformationConfig::new(&pipeline);
        config.random_state = Some(5);
        (
            DataIngestionArtifact {
                trained_file_path: train,
                test_file_path: test,
            },
            config,
        )
    }

    fn passed(dir: &std::path::Path) -> DataValidationArtifact {
        DataValidationArtifact {
            validation_status: true,
            message: String::new(),
            validation_report_file_path: dir.join("report.yaml"),
        }
    }

    #[test]
    fn test_rejects_failed_validation() {
        let dir = tempfile::tempdir().unwrap();
        let (ingestion, config) = setup(dir.path());
        let schema = SchemaConfig::from_yaml_str(SCHEMA).unwrap();
        let failed = DataValidationArtifact {
            validation_status: false,
            message: "Columns are missing in test dataframe. ".into(),
            validation_report_file_path: dir.path().join("report.yaml"),
        };

        let err = DataTransformation::new(&ingestion, &failed, &config, &schema)
            .initiate_data_transformation()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataQuality);
        assert!(err.to_string().contains("Columns are missing in test dataframe."));
        assert!(!config.transformed_object_file_path.exists());
    }

    #[test]
    fn test_train_balanced_and_test_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (ingestion, config) = setup(dir.path());
        let schema = SchemaConfig::from_yaml_str(SCHEMA).unwrap();
        let validation = passed(dir.path());

        let artifact = DataTransformation::new(&ingestion, &validation, &config, &schema)
            .initiate_data_transformation()
            .unwrap();

        let train = load_array(&artifact.transformed_train_file_path).unwrap();
        let test = load_array(&artifact.transformed_test_file_path).unwrap();
        // Age, Gender, Vehicle_Damage_Yes plus label
        assert_eq!(train.ncols(), 4);
        assert_eq!(test.dim(), (12, 4));

        let positives = train.column(3).iter().filter(|&&v| v == 1.0).count();
        let negatives = train.column(3).iter().filter(|&&v| v == 0.0).count();
        assert_eq!(positives, negatives);

        let preprocessor: Preprocessor = load_object(&artifact.transformed_object_file_path).unwrap();
        assert_eq!(preprocessor.feature_names(), vec!["Age", "Gender", "Vehicle_Damage_Yes"]);
    }

    #[test]
    fn test_unknown_gender_fails_before_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let (ingestion, config) = setup(dir.path());
        std::fs::write(
            &ingestion.trained_file_path,
            "id,Gender,Age,Vehicle_Damage,Response\n1,Other,30,No,0\n2,Male,40,Yes,1\n",
        )
        .unwrap();
        let schema = SchemaConfig::from_yaml_str(SCHEMA).unwrap();
        let validation = passed(dir.path());

        let err = DataTransformation::new(&ingestion, &validation, &config, &schema)
            .initiate_data_transformation()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataQuality);
        assert!(!config.transformed_train_file_path.exists());
    }
}
