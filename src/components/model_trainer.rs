//! Random forest training and scoring

use crate::config::ModelTrainerConfig;
use crate::entity::{
    ClassificationMetricArtifact, DataTransformationArtifact, ModelBundle, ModelTrainerArtifact,
};
use crate::error::{PipelineError, Result};
use crate::preprocessing::{split_label, Preprocessor};
use crate::training::{ClassificationMetrics, RandomForest};
use crate::utils::{load_array, load_object};
use ndarray::Array2;

pub struct ModelTrainer<'a> {
    transformation_artifact: &'a DataTransformationArtifact,
    config: &'a ModelTrainerConfig,
}

impl<'a> ModelTrainer<'a> {
    pub fn new(
        transformation_artifact: &'a DataTransformationArtifact,
        config: &'a ModelTrainerConfig,
    ) -> Self {
        Self {
            transformation_artifact,
            config,
        }
    }

    fn build_model(&self) -> RandomForest {
        RandomForest::new(self.config.n_estimators)
            .with_min_samples_split(self.config.min_samples_split)
            .with_min_samples_leaf(self.config.min_samples_leaf)
            .with_max_depth(self.config.max_depth)
            .with_criterion(self.config.criterion)
            .with_random_state(self.config.random_state)
    }

    /// Fit on `train` and score on `test`; both carry the label as last column
    pub fn get_model_object_and_report(
        &self,
        train: &Array2<f64>,
        test: &Array2<f64>,
    ) -> Result<(RandomForest, ClassificationMetricArtifact)> {
        let (x_train, y_train) = split_label(train)?;
        let (x_test, y_test) = split_label(test)?;

        tracing::info!(
            rows = x_train.nrows(),
            features = x_train.ncols(),
            n_estimators = self.config.n_estimators,
            "training random forest"
        );
        let mut model = self.build_model();
        model.fit(&x_train, &y_train)?;

        let metrics = ClassificationMetrics::compute(&y_test, &model.predict(&x_test)?)?;
        tracing::info!(
            accuracy = metrics.accuracy,
            f1 = metrics.f1_score,
            precision = metrics.precision,
            recall = metrics.recall,
            "held-out metrics"
        );

        Ok((model, metrics.into()))
    }

    pub fn initiate_model_trainer(&self) -> Result<ModelTrainerArtifact> {
        tracing::info!("starting model trainer");

        let train = load_array(&self.transformation_artifact.transformed_train_file_path)?;
        let test = load_array(&self.transformation_artifact.transformed_test_file_path)?;

        let (model, metric_artifact) = self.get_model_object_and_report(&train, &test)?;

        let (x_train, y_train) = split_label(&train)?;
        let train_accuracy = ClassificationMetrics::compute(&y_train, &model.predict(&x_train)?)?.accuracy;
        if train_accuracy < self.config.expected_accuracy {
            tracing::error!(
                train_accuracy,
                expected = self.config.expected_accuracy,
                "training accuracy below floor"
            );
            return Err(PipelineError::model_quality(format!(
                "No model found with score above the base score: training accuracy {:.4} < {:.4}",
                train_accuracy, self.config.expected_accuracy
            )));
        }

        let preprocessor: Preprocessor =
            load_object(&self.transformation_artifact.transformed_object_file_path)?;
        ModelBundle::new(preprocessor, model).save(&self.config.trained_model_file_path)?;

        let artifact = ModelTrainerArtifact {
            trained_model_file_path: self.config.trained_model_file_path.clone(),
            metric_artifact,
        };
        tracing::info!(?artifact, "model trainer complete");
        Ok(artifact)
    }
}
