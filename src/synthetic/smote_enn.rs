//! SMOTE followed by Edited Nearest Neighbours cleaning

use super::{class_counts, EditedNearestNeighbours, ResampleResult, Sampler, SMOTE};
use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Oversample the minority class with SMOTE, then clean every class with ENN
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SMOTEENN {
    smote: SMOTE,
    enn: EditedNearestNeighbours,
}

impl SMOTEENN {
    pub fn new(smote: SMOTE, enn: EditedNearestNeighbours) -> Self {
        Self { smote, enn }
    }
}

impl Sampler for SMOTEENN {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        self.smote.fit(x, y)
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        let oversampled = self.smote.resample(x, y)?;

        let mut enn = self.enn.clone();
        let cleaned = enn.fit_resample(&oversampled.x, &oversampled.y)?;

        tracing::info!(
            before = ?class_counts(y),
            after = ?class_counts(&cleaned.y),
            synthetic = oversampled.y.len() - y.len(),
            removed = cleaned.n_removed,
            "SMOTEENN resampling"
        );

        Ok(ResampleResult {
            x: cleaned.x,
            y: cleaned.y,
            n_synthetic: oversampled.n_synthetic,
            n_removed: cleaned.n_removed,
        })
    }
}
