//! Collection export and train/test split

use crate::config::DataIngestionConfig;
use crate::data_access::DocumentSource;
use crate::entity::DataIngestionArtifact;
use crate::error::Result;
use crate::utils::write_csv;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct DataIngestion<'a> {
    config: &'a DataIngestionConfig,
    source: &'a dyn DocumentSource,
}

impl<'a> DataIngestion<'a> {
    pub fn new(config: &'a DataIngestionConfig, source: &'a dyn DocumentSource) -> Self {
        Self { config, source }
    }

    /// Export the configured collection and persist it as the feature store
    pub fn export_data_into_feature_store(&self) -> Result<DataFrame> {
        tracing::info!(collection = %self.config.collection_name, "exporting data from document store");
        let mut df = self.source.export_collection(&self.config.collection_name)?;
        tracing::info!(rows = df.height(), columns = df.width(), "collection loaded");

        write_csv(&mut df, &self.config.feature_store_file_path)?;
        Ok(df)
    }

    /// Shuffle rows and hold out `ceil(ratio * n)` of them as the test split
    pub fn split_data_as_train_test(&self, df: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        let n = df.height();
        let n_test = ((self.config.train_test_split_ratio * n as f64).ceil() as usize).min(n);

        let mut rng = match self.config.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut order: Vec<IdxSize> = (0..n as IdxSize).collect();
        order.shuffle(&mut rng);

        let (test_idx, train_idx) = order.split_at(n_test);
        let mut train = df.take(&IdxCa::from_vec("idx".into(), train_idx.to_vec()))?;
        let mut test = df.take(&IdxCa::from_vec("idx".into(), test_idx.to_vec()))?;

        write_csv(&mut train, &self.config.training_file_path)?;
        write_csv(&mut test, &self.config.testing_file_path)?;
        tracing::info!(train_rows = train.height(), test_rows = test.height(), "train/test split written");

        Ok((train, test))
    }

    pub fn initiate_data_ingestion(&self) -> Result<DataIngestionArtifact> {
        tracing::info!("starting data ingestion");
        let df = self.export_data_into_feature_store()?;
        self.split_data_as_train_test(&df)?;

        let artifact = DataIngestionArtifact {
            trained_file_path: self.config.training_file_path.clone(),
            test_file_path: self.config.testing_file_path.clone(),
        };
        tracing::info!(?artifact, "data ingestion complete");
        Ok(artifact)
    }
}
