//! Data preprocessing module
//!
//! Provides the fitted transform applied before training and prediction:
//! - Feature engineering (gender mapping, identifier drop, one-hot encoding)
//! - Column-wise scaling (StandardScaler, MinMaxScaler) into a dense matrix

mod column_transformer;
mod features;
mod scaler;

pub use column_transformer::ColumnTransformer;
pub use features::{map_gender_column, FeatureEngineer, GENDER_COLUMN};
pub use scaler::{Scaler, ScalerType};

use crate::config::SchemaConfig;
use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Feature engineering followed by the column transformer, fitted on the
/// training split and persisted as one object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    engineer: FeatureEngineer,
    transformer: ColumnTransformer,
}

impl Preprocessor {
    pub fn new(engineer: FeatureEngineer, transformer: ColumnTransformer) -> Self {
        Self {
            engineer,
            transformer,
        }
    }

    /// Build an unfitted preprocessor from the schema's column groups
    pub fn from_schema(schema: &SchemaConfig) -> Self {
        Self::new(
            FeatureEngineer::new(schema.drop_columns.clone()),
            ColumnTransformer::new(schema.num_features.clone(), schema.mm_columns.clone()),
        )
    }

    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let engineered = self.engineer.fit_transform(df)?;
        self.transformer.fit(&engineered)?;
        Ok(self)
    }

    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let engineered = self.engineer.transform(df)?;
        self.transformer.transform(&engineered)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Names of the matrix columns
    pub fn feature_names(&self) -> Vec<String> {
        self.transformer.output_columns()
    }
}

/// Separate the label column from the features
pub fn split_target(df: &DataFrame, target: &str) -> Result<(DataFrame, Array1<i64>)> {
    let column = df
        .column(target)
        .map_err(|_| PipelineError::data_quality(format!("target column '{}' not found", target)))?;
    let labels = column.as_materialized_series().cast(&DataType::Int64)?;
    let ca = labels.i64()?;
    if ca.null_count() > 0 {
        return Err(PipelineError::data_quality(format!(
            "target column '{}' has {} null value(s)",
            target,
            ca.null_count()
        )));
    }
    let y: Array1<i64> = ca.into_no_null_iter().collect();

    Ok((df.drop(target)?, y))
}

/// Append `y` as the last column of `x`
pub fn append_label(x: &Array2<f64>, y: &Array1<i64>) -> Result<Array2<f64>> {
    let label = y.mapv(|v| v as f64).insert_axis(ndarray::Axis(1));
    Ok(ndarray::concatenate(ndarray::Axis(1), &[x.view(), label.view()])?)
}

/// Split a persisted matrix into features and the last-column label
pub fn split_label(data: &Array2<f64>) -> Result<(Array2<f64>, Array1<i64>)> {
    let n_cols = data.ncols();
    if n_cols < 2 {
        return Err(PipelineError::data_quality(format!(
            "expected features plus label, got {} column(s)",
            n_cols
        )));
    }
    let x = data.slice(ndarray::s![.., ..n_cols - 1]).to_owned();
    let y = data.column(n_cols - 1).mapv(|v| v.round() as i64);
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn schema() -> SchemaConfig {
        SchemaConfig::from_yaml_str(
            r#"
columns:
  - id: int
  - Gender: category
  - Age: int
  - Vehicle_Damage: category
  - Annual_Premium: float
  - Response: int
numerical_columns: [Age, Annual_Premium]
categorical_columns: [Gender, Vehicle_Damage]
drop_columns: id
num_features: [Age]
mm_columns: [Annual_Premium]
"#,
        )
        .unwrap()
    }

    fn frame() -> DataFrame {
        df!(
            "id" => [1i64, 2, 3, 4],
            "Gender" => ["Male", "Female", "Male", "Female"],
            "Age" => [21i64, 35, 48, 60],
            "Vehicle_Damage" => ["Yes", "No", "No", "Yes"],
            "Annual_Premium" => [1000.0, 2000.0, 3000.0, 5000.0],
            "Response" => [1i64, 0, 0, 1]
        )
        .unwrap()
    }

    #[test]
    fn test_preprocessor_end_to_end() {
        let (features, y) = split_target(&frame(), "Response").unwrap();
        assert_eq!(y, array![1, 0, 0, 1]);

        let mut pre = Preprocessor::from_schema(&schema());
        let x = pre.fit_transform(&features).unwrap();

        assert_eq!(
            pre.feature_names(),
            vec!["Age", "Annual_Premium", "Gender", "Vehicle_Damage_Yes"]
        );
        assert_eq!(x.dim(), (4, 4));
        assert_eq!(x.column(2).to_vec(), vec![1.0, 0.0, 1.0, 0.0]);
        assert_eq!(x.column(3).to_vec(), vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_transform_twice_is_identical() {
        let (features, _) = split_target(&frame(), "Response").unwrap();
        let mut pre = Preprocessor::from_schema(&schema());
        pre.fit(&features).unwrap();
        assert_eq!(pre.transform(&features).unwrap(), pre.transform(&features).unwrap());
    }

    #[test]
    fn test_label_column_helpers() {
        let x = array![[0.5, 1.5], [2.5, 3.5]];
        let y = array![0i64, 1];
        let joined = append_label(&x, &y).unwrap();
        assert_eq!(joined.dim(), (2, 3));

        let (x2, y2) = split_label(&joined).unwrap();
        assert_eq!(x2, x);
        assert_eq!(y2, y);
    }
}
