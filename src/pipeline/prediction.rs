//! Scoring raw customer rows with the deployed bundle

use crate::cloud_storage::ModelStore;
use crate::config::PredictorConfig;
use crate::entity::ModelBundle;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One raw customer record, as entered before any feature engineering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InsuranceData {
    pub gender: String,
    pub age: i64,
    #[serde(rename = "Driving_License")]
    pub driving_license: i64,
    #[serde(rename = "Region_Code")]
    pub region_code: f64,
    #[serde(rename = "Previously_Insured")]
    pub previously_insured: i64,
    #[serde(rename = "Annual_Premium")]
    pub annual_premium: f64,
    #[serde(rename = "Policy_Sales_Channel")]
    pub policy_sales_channel: f64,
    pub vintage: i64,
    #[serde(rename = "Vehicle_Age")]
    pub vehicle_age: String,
    #[serde(rename = "Vehicle_Damage")]
    pub vehicle_damage: String,
}

impl InsuranceData {
    /// Single-row frame with the raw column names
    pub fn to_frame(&self) -> Result<DataFrame> {
        Ok(df!(
            "Gender" => [self.gender.as_str()],
            "Age" => [self.age],
            "Driving_License" => [self.driving_license],
            "Region_Code" => [self.region_code],
            "Previously_Insured" => [self.previously_insured],
            "Annual_Premium" => [self.annual_premium],
            "Policy_Sales_Channel" => [self.policy_sales_channel],
            "Vintage" => [self.vintage],
            "Vehicle_Age" => [self.vehicle_age.as_str()],
            "Vehicle_Damage" => [self.vehicle_damage.as_str()]
        )?)
    }
}

/// Loads the deployed bundle from the model store and predicts labels
pub struct PredictionPipeline {
    config: PredictorConfig,
    store: Box<dyn ModelStore>,
}

impl PredictionPipeline {
    pub fn new(config: PredictorConfig, store: Box<dyn ModelStore>) -> Self {
        Self { config, store }
    }

    pub fn load_model(&self) -> Result<ModelBundle> {
        tracing::info!(
            bucket = %self.config.model_bucket_name,
            key = %self.config.model_file_path,
            "loading deployed model"
        );
        let bytes = self
            .store
            .download(&self.config.model_bucket_name, &self.config.model_file_path)?;
        ModelBundle::from_bytes(&bytes)
    }

    pub fn predict(&self, df: &DataFrame) -> Result<Vec<i64>> {
        let bundle = self.load_model()?;
        let predictions = bundle.predict(df)?;
        tracing::info!(rows = predictions.len(), "prediction complete");
        Ok(predictions.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insurance_data_frame() {
        let row = InsuranceData {
            gender: "Male".into(),
            age: 44,
            driving_license: 1,
            region_code: 28.0,
            previously_insured: 0,
            annual_premium: 40454.0,
            policy_sales_channel: 26.0,
            vintage: 217,
            vehicle_age: "> 2 Years".into(),
            vehicle_damage: "Yes".into(),
        };

        let df = row.to_frame().unwrap();
        assert_eq!(df.shape(), (1, 10));
        assert_eq!(df.column("Vehicle_Age").unwrap().str().unwrap().get(0), Some("> 2 Years"));
    }

    #[test]
    fn test_insurance_data_field_names() {
        let json = r#"{"Gender":"Female","Age":23,"Driving_License":1,"Region_Code":8.0,
            "Previously_Insured":1,"Annual_Premium":2630.0,"Policy_Sales_Channel":152.0,
            "Vintage":45,"Vehicle_Age":"< 1 Year","Vehicle_Damage":"No"}"#;
        let row: InsuranceData = serde_json::from_str(json).unwrap();
        assert_eq!(row.gender, "Female");
        assert_eq!(row.vehicle_age, "< 1 Year");
    }
}
