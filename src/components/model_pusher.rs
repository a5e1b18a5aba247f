//! Upload of the accepted bundle

use crate::cloud_storage::ModelStore;
use crate::config::ModelPusherConfig;
use crate::entity::{ModelEvaluationArtifact, ModelPusherArtifact};
use crate::error::Result;

pub struct ModelPusher<'a> {
    evaluation_artifact: &'a ModelEvaluationArtifact,
    config: &'a ModelPusherConfig,
    store: &'a dyn ModelStore,
}

impl<'a> ModelPusher<'a> {
    pub fn new(
        evaluation_artifact: &'a ModelEvaluationArtifact,
        config: &'a ModelPusherConfig,
        store: &'a dyn ModelStore,
    ) -> Self {
        Self {
            evaluation_artifact,
            config,
            store,
        }
    }

    /// Upload the trained bundle, replacing the deployed object
    pub fn initiate_model_pusher(&self) -> Result<ModelPusherArtifact> {
        tracing::info!(
            bucket = %self.config.bucket_name,
            key = %self.config.s3_model_key_path,
            "pushing model"
        );
        self.store.upload(
            &self.evaluation_artifact.trained_model_path,
            &self.config.bucket_name,
            &self.config.s3_model_key_path,
        )?;

        Ok(ModelPusherArtifact {
            bucket_name: self.config.bucket_name.clone(),
            s3_model_path: self.config.s3_model_key_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud_storage::LocalModelStore;

    #[test]
    fn test_push_overwrites_deployed_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalModelStore::new(dir.path().join("store"));
        let model_path = dir.path().join("model.bin");
        std::fs::write(&model_path, b"bundle-v2").unwrap();
        std::fs::create_dir_all(dir.path().join("store/bucket")).unwrap();
        std::fs::write(dir.path().join("store/bucket/model.bin"), b"bundle-v1").unwrap();

        let evaluation = ModelEvaluationArtifact {
            is_model_accepted: true,
            changed_accuracy: 0.1,
            trained_model_score: 0.8,
            deployed_model_score: Some(0.7),
            s3_model_path: "model.bin".into(),
            trained_model_path: model_path,
        };
        let config = ModelPusherConfig {
            bucket_name: "bucket".into(),
            s3_model_key_path: "model.bin".into(),
        };

        let artifact = ModelPusher::new(&evaluation, &config, &store)
            .initiate_model_pusher()
            .unwrap();
        assert_eq!(artifact.bucket_name, "bucket");
        assert_eq!(store.download("bucket", "model.bin").unwrap(), b"bundle-v2");
    }
}
