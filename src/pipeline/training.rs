//! Training orchestrator

use crate::cloud_storage::ModelStore;
use crate::components::{
    DataIngestion, DataTransformation, DataValidation, ModelEvaluation, ModelPusher, ModelTrainer,
};
use crate::config::{PipelineConfig, SchemaConfig};
use crate::data_access::DocumentSource;
use crate::entity::{
    DataIngestionArtifact, DataTransformationArtifact, DataValidationArtifact,
    ModelEvaluationArtifact, ModelPusherArtifact, ModelTrainerArtifact,
};
use crate::error::Result;
use serde::Serialize;

/// Artifacts of one completed run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub ingestion: DataIngestionArtifact,
    pub validation: DataValidationArtifact,
    pub transformation: DataTransformationArtifact,
    pub trainer: ModelTrainerArtifact,
    pub evaluation: ModelEvaluationArtifact,
    /// `None` when evaluation rejected the trained bundle
    pub pusher: Option<ModelPusherArtifact>,
}

/// Owns the run configuration and the external clients for one run
pub struct TrainPipeline {
    config: PipelineConfig,
    schema: SchemaConfig,
    source: Box<dyn DocumentSource>,
    store: Box<dyn ModelStore>,
}

impl TrainPipeline {
    pub fn new(
        config: PipelineConfig,
        schema: SchemaConfig,
        source: Box<dyn DocumentSource>,
        store: Box<dyn ModelStore>,
    ) -> Self {
        Self {
            config,
            schema,
            source,
            store,
        }
    }

    pub fn start_data_ingestion(&self) -> Result<DataIngestionArtifact> {
        DataIngestion::new(&self.config.data_ingestion, self.source.as_ref()).initiate_data_ingestion()
    }

    pub fn start_data_validation(
        &self,
        ingestion: &DataIngestionArtifact,
    ) -> Result<DataValidationArtifact> {
        DataValidation::new(ingestion, &self.config.data_validation, &self.schema)
            .initiate_data_validation()
    }

    pub fn start_data_transformation(
        &self,
        ingestion: &DataIngestionArtifact,
        validation: &DataValidationArtifact,
    ) -> Result<DataTransformationArtifact> {
        DataTransformation::new(
            ingestion,
            validation,
            &self.config.data_transformation,
            &self.schema,
        )
        .initiate_data_transformation()
    }

    pub fn start_model_trainer(
        &self,
        transformation: &DataTransformationArtifact,
    ) -> Result<ModelTrainerArtifact> {
        ModelTrainer::new(transformation, &self.config.model_trainer).initiate_model_trainer()
    }

    pub fn start_model_evaluation(
        &self,
        ingestion: &DataIngestionArtifact,
        trainer: &ModelTrainerArtifact,
    ) -> Result<ModelEvaluationArtifact> {
        ModelEvaluation::new(
            &self.config.model_evaluation,
            ingestion,
            trainer,
            self.store.as_ref(),
        )
        .initiate_model_evaluation()
    }

    pub fn start_model_pusher(
        &self,
        evaluation: &ModelEvaluationArtifact,
    ) -> Result<ModelPusherArtifact> {
        ModelPusher::new(evaluation, &self.config.model_pusher, self.store.as_ref())
            .initiate_model_pusher()
    }

    /// Run every stage in order; the push is skipped when evaluation rejects
    pub fn run_pipeline(&self) -> Result<PipelineRun> {
        tracing::info!(
            artifact_dir = %self.config.training_pipeline.artifact_dir.display(),
            "training pipeline started"
        );

        let ingestion = self.start_data_ingestion()?;
        let validation = self.start_data_validation(&ingestion)?;
        let transformation = self.start_data_transformation(&ingestion, &validation)?;
        let trainer = self.start_model_trainer(&transformation)?;
        let evaluation = self.start_model_evaluation(&ingestion, &trainer)?;

        let pusher = if evaluation.is_model_accepted {
            Some(self.start_model_pusher(&evaluation)?)
        } else {
            tracing::info!("trained model not accepted, skipping push");
            None
        };

        tracing::info!("training pipeline finished");
        Ok(PipelineRun {
            ingestion,
            validation,
            transformation,
            trainer,
            evaluation,
            pusher,
        })
    }
}
