//! Edited Nearest Neighbours undersampling

use super::{class_counts, nearest_neighbors, ResampleResult, Sampler};
use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Removes samples whose nearest neighbours disagree with their label.
///
/// A sample is kept only when all of its neighbours share its label. Every
/// class is cleaned; neighbours are searched over the whole data set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditedNearestNeighbours {
    n_neighbors: usize,
    fitted: bool,
}

impl EditedNearestNeighbours {
    pub fn new() -> Self {
        Self {
            n_neighbors: 3,
            fitted: false,
        }
    }

    pub fn with_n_neighbors(mut self, k: usize) -> Self {
        self.n_neighbors = k.max(1);
        self
    }

    fn keep(label: i64, neighbor_labels: &[i64]) -> bool {
        neighbor_labels.iter().all(|&l| l == label)
    }
}

impl Default for EditedNearestNeighbours {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for EditedNearestNeighbours {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PipelineError::data_quality(format!(
                "feature rows ({}) and labels ({}) differ",
                x.nrows(),
                y.len()
            )));
        }
        self.fitted = true;
        Ok(())
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        if !self.fitted {
            return Err(PipelineError::data_quality("ENN not fitted"));
        }

        let n_samples = x.nrows();
        if n_samples <= self.n_neighbors {
            return Ok(ResampleResult {
                x: x.clone(),
                y: y.clone(),
                n_synthetic: BTreeMap::new(),
                n_removed: 0,
            });
        }

        let all: Vec<usize> = (0..n_samples).collect();
        let kept: Vec<usize> = (0..n_samples)
            .into_par_iter()
            .filter(|&i| {
                let neighbors = nearest_neighbors(x.row(i), x, &all, Some(i), self.n_neighbors);
                let labels: Vec<i64> = neighbors.iter().map(|&j| y[j]).collect();
                Self::keep(y[i], &labels)
            })
            .collect();

        let result_y = y.select(Axis(0), &kept);
        tracing::debug!(
            removed = n_samples - kept.len(),
            remaining = ?class_counts(&result_y),
            "edited nearest neighbours"
        );

        Ok(ResampleResult {
            x: x.select(Axis(0), &kept),
            y: result_y,
            n_synthetic: BTreeMap::new(),
            n_removed: n_samples - kept.len(),
        })
    }
}
