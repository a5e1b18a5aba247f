//! Comparison of the trained bundle against the deployed one

use crate::cloud_storage::ModelStore;
use crate::config::ModelEvaluationConfig;
use crate::entity::{DataIngestionArtifact, ModelBundle, ModelEvaluationArtifact, ModelTrainerArtifact};
use crate::error::Result;
use crate::preprocessing::split_target;
use crate::training::f1_score;
use crate::utils::read_csv;
use ndarray::Array1;
use polars::prelude::DataFrame;

/// F1 of both bundles on the same raw test rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluateModelResponse {
    pub trained_model_f1_score: f64,
    pub best_model_f1_score: Option<f64>,
    pub is_model_accepted: bool,
    pub difference: f64,
}

/// Accept when nothing is deployed or the gain exceeds `threshold`
pub fn is_improvement(trained: f64, deployed: Option<f64>, threshold: f64) -> bool {
    match deployed {
        None => true,
        Some(deployed) => trained - deployed > threshold,
    }
}

pub struct ModelEvaluation<'a> {
    config: &'a ModelEvaluationConfig,
    ingestion_artifact: &'a DataIngestionArtifact,
    trainer_artifact: &'a ModelTrainerArtifact,
    store: &'a dyn ModelStore,
}

impl<'a> ModelEvaluation<'a> {
    pub fn new(
        config: &'a ModelEvaluationConfig,
        ingestion_artifact: &'a DataIngestionArtifact,
        trainer_artifact: &'a ModelTrainerArtifact,
        store: &'a dyn ModelStore,
    ) -> Self {
        Self {
            config,
            ingestion_artifact,
            trainer_artifact,
            store,
        }
    }

    /// The deployed bundle, if the store holds one
    pub fn get_best_model(&self) -> Result<Option<ModelBundle>> {
        let bucket = &self.config.bucket_name;
        let key = &self.config.s3_model_key_path;

        if !self.store.is_model_present(bucket, key)? {
            tracing::info!(bucket = %bucket, key = %key, "no deployed model found");
            return Ok(None);
        }
        let bytes = self.store.download(bucket, key)?;
        Ok(Some(ModelBundle::from_bytes(&bytes)?))
    }

    fn score(bundle: &ModelBundle, features: &DataFrame, labels: &Array1<i64>) -> Result<f64> {
        f1_score(labels, &bundle.predict(features)?)
    }

    pub fn evaluate_model(&self) -> Result<EvaluateModelResponse> {
        let test = read_csv(&self.ingestion_artifact.test_file_path)?;
        let (features, labels) = split_target(&test, &self.config.target_column)?;

        let trained = ModelBundle::load(&self.trainer_artifact.trained_model_file_path)?;
        let trained_score = Self::score(&trained, &features, &labels)?;

        let deployed_score = match self.get_best_model()? {
            Some(deployed) => Some(Self::score(&deployed, &features, &labels)?),
            None => None,
        };

        let response = EvaluateModelResponse {
            trained_model_f1_score: trained_score,
            best_model_f1_score: deployed_score,
            is_model_accepted: is_improvement(
                trained_score,
                deployed_score,
                self.config.changed_threshold_score,
            ),
            difference: trained_score - deployed_score.unwrap_or(0.0),
        };
        tracing::info!(
            trained = response.trained_model_f1_score,
            deployed = ?response.best_model_f1_score,
            accepted = response.is_model_accepted,
            "model evaluation scores"
        );
        Ok(response)
    }

    pub fn initiate_model_evaluation(&self) -> Result<ModelEvaluationArtifact> {
        tracing::info!("starting model evaluation");
        let response = self.evaluate_model()?;

        Ok(ModelEvaluationArtifact {
            is_model_accepted: response.is_model_accepted,
            changed_accuracy: response.difference,
            trained_model_score: response.trained_model_f1_score,
            deployed_model_score: response.best_model_f1_score,
            s3_model_path: self.config.s3_model_key_path.clone(),
            trained_model_path: self.trainer_artifact.trained_model_file_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_deployed_model_accepts() {
        assert!(is_improvement(0.1, None, 0.02));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!is_improvement(0.72, Some(0.70), 0.05));
        assert!(is_improvement(0.80, Some(0.70), 0.05));
        assert!(!is_improvement(0.70, Some(0.70), 0.0));
        assert!(!is_improvement(0.60, Some(0.70), 0.02));
    }
}
