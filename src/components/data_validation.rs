//! Schema checks on the ingested splits

use crate::config::{DataValidationConfig, SchemaConfig};
use crate::entity::{DataIngestionArtifact, DataValidationArtifact};
use crate::error::Result;
use crate::utils::{read_csv, write_json_report};
use polars::prelude::DataFrame;
use serde::Serialize;

const TRAIN_COLUMNS_MISSING: &str = "Columns are missing in training dataframe. ";
const TEST_COLUMNS_MISSING: &str = "Columns are missing in test dataframe. ";

#[derive(Debug, Serialize)]
struct ValidationReport<'a> {
    validation_status: bool,
    message: &'a str,
}

/// True iff `df` has as many columns as the schema declares
pub fn validate_number_of_columns(df: &DataFrame, schema: &SchemaConfig) -> bool {
    let status = df.width() == schema.columns.len();
    tracing::info!(status, expected = schema.columns.len(), found = df.width(), "column count check");
    status
}

/// True iff every declared numerical and categorical column is present
pub fn is_column_exist(df: &DataFrame, schema: &SchemaConfig) -> bool {
    let missing = |declared: &[String]| -> Vec<String> {
        declared
            .iter()
            .filter(|name| df.get_column_index(name.as_str()).is_none())
            .cloned()
            .collect()
    };

    let missing_numerical = missing(&schema.numerical_columns);
    if !missing_numerical.is_empty() {
        tracing::info!(columns = ?missing_numerical, "missing numerical column(s)");
    }
    let missing_categorical = missing(&schema.categorical_columns);
    if !missing_categorical.is_empty() {
        tracing::info!(columns = ?missing_categorical, "missing categorical column(s)");
    }

    missing_numerical.is_empty() && missing_categorical.is_empty()
}

/// Accumulated failure message for a pair of splits; empty when valid
pub fn validate_frames(train: &DataFrame, test: &DataFrame, schema: &SchemaConfig) -> String {
    let mut message = String::new();

    if !validate_number_of_columns(train, schema) {
        message.push_str(TRAIN_COLUMNS_MISSING);
    }
    if !validate_number_of_columns(test, schema) {
        message.push_str(TEST_COLUMNS_MISSING);
    }
    if !is_column_exist(train, schema) {
        message.push_str(TRAIN_COLUMNS_MISSING);
    }
    if !is_column_exist(test, schema) {
        message.push_str(TEST_COLUMNS_MISSING);
    }

    message
}

/// Check both splits against the schema and persist a report
pub struct DataValidation<'a> {
    ingestion_artifact: &'a DataIngestionArtifact,
    config: &'a DataValidationConfig,
    schema: &'a SchemaConfig,
}

impl<'a> DataValidation<'a> {
    pub fn new(
        ingestion_artifact: &'a DataIngestionArtifact,
        config: &'a DataValidationConfig,
        schema: &'a SchemaConfig,
    ) -> Self {
        Self {
            ingestion_artifact,
            config,
            schema,
        }
    }

    pub fn initiate_data_validation(&self) -> Result<DataValidationArtifact> {
        tracing::info!("starting data validation");

        let train = read_csv(&self.ingestion_artifact.trained_file_path)?;
        let test = read_csv(&self.ingestion_artifact.test_file_path)?;

        let message = validate_frames(&train, &test, self.schema);
        let validation_status = message.is_empty();

        write_json_report(
            &self.config.validation_report_file_path,
            &ValidationReport {
                validation_status,
                message: message.trim(),
            },
        )?;

        if validation_status {
            tracing::info!("data validation passed");
        } else {
            tracing::warn!(message = %message.trim(), "data validation failed");
        }

        Ok(DataValidationArtifact {
            validation_status,
            message,
            validation_report_file_path: self.config.validation_report_file_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn schema() -> SchemaConfig {
        SchemaConfig::from_yaml_str(
            r#"
columns:
  - Gender: category
  - Age: int
  - Response: int
numerical_columns: [Age, Response]
categorical_columns: [Gender]
"#,
        )
        .unwrap()
    }

    fn valid_frame() -> DataFrame {
        df!("Gender" => ["Male"], "Age" => [30i64], "Response" => [0i64]).unwrap()
    }

    #[test]
    fn test_column_count() {
        let schema = schema();
        assert!(validate_number_of_columns(&valid_frame(), &schema));

        let extra = valid_frame().hstack(&[Column::new("x".into(), [1i64])]).unwrap();
        assert!(!validate_number_of_columns(&extra, &schema));
    }

    #[test]
    fn test_column_existence_ignores_dtypes() {
        let schema = schema();
        let retyped = df!("Gender" => [1i64], "Age" => ["thirty"], "Response" => [0i64]).unwrap();
        assert!(is_column_exist(&retyped, &schema));

        let missing = valid_frame().drop("Gender").unwrap();
        assert!(!is_column_exist(&missing, &schema));
    }

    #[test]
    fn test_message_accumulates_per_check() {
        let schema = schema();
        assert_eq!(validate_frames(&valid_frame(), &valid_frame(), &schema), "");

        let broken = valid_frame().drop("Age").unwrap();
        assert_eq!(
            validate_frames(&valid_frame(), &broken, &schema),
            "Columns are missing in test dataframe. Columns are missing in test dataframe. "
        );
    }

    #[test]
    fn test_report_written_with_trimmed_message() {
        let schema = schema();
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        let test_path = dir.path().join("test.csv");
        std::fs::write(&train_path, "Gender,Age,Response\nMale,30,0\n").unwrap();
        std::fs::write(&test_path, "Gender,Response\nMale,0\n").unwrap();

        let artifact = DataIngestionArtifact {
            trained_file_path: train_path,
            test_file_path: test_path,
        };
        let config = DataValidationConfig {
            data_validation_dir: dir.path().to_path_buf(),
            validation_report_file_path: dir.path().join("data_validation/report.yaml"),
        };

        let result = DataValidation::new(&artifact, &config, &schema)
            .initiate_data_validation()
            .unwrap();
        assert!(!result.validation_status);

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&result.validation_report_file_path).unwrap())
                .unwrap();
        assert_eq!(report["validation_status"], false);
        assert_eq!(
            report["message"],
            "Columns are missing in test dataframe. Columns are missing in test dataframe."
        );
    }
}
