//! Deployable model bundle

use crate::error::Result;
use crate::preprocessing::Preprocessor;
use crate::training::RandomForest;
use crate::utils::{decode_object, load_object, save_object};
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fitted preprocessor and classifier, persisted and shipped as one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub preprocessor: Preprocessor,
    pub model: RandomForest,
}

impl ModelBundle {
    pub fn new(preprocessor: Preprocessor, model: RandomForest) -> Self {
        Self {
            preprocessor,
            model,
        }
    }

    /// Predict labels for raw rows (label column absent)
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<i64>> {
        let x = self.preprocessor.transform(df)?;
        self.model.predict(&x)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_object(path, self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_object(path)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_object(bytes)
    }
}
