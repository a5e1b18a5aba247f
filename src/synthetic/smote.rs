//! SMOTE oversampling

use super::{class_counts, class_indices, nearest_neighbors, ResampleResult, Sampler};
use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// SMOTE (Synthetic Minority Over-sampling Technique)
///
/// Oversamples the minority class up to the majority count by interpolating
/// between a minority row and one of its `k_neighbors` nearest minority rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SMOTE {
    /// Number of nearest neighbors
    k_neighbors: usize,
    /// Random seed
    seed: Option<u64>,
    /// Target samples per class
    target_counts: Option<BTreeMap<i64, usize>>,
}

impl SMOTE {
    /// Create new SMOTE sampler
    pub fn new() -> Self {
        Self {
            k_neighbors: 5,
            seed: None,
            target_counts: None,
        }
    }

    /// Set number of neighbors
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k.max(1);
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SMOTE {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for SMOTE {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        let counts = class_counts(y);

        if counts.len() < 2 {
            return Err(PipelineError::data_quality(format!(
                "SMOTE needs at least 2 classes, found {}",
                counts.len()
            )));
        }

        let majority = counts.values().copied().max().unwrap_or(0);
        let (&minority_class, &minority_count) = counts
            .iter()
            .min_by_key(|(_, count)| **count)
            .ok_or_else(|| PipelineError::data_quality("empty label vector"))?;

        if minority_count < 2 {
            return Err(PipelineError::data_quality(format!(
                "minority class {} has {} sample(s), SMOTE needs at least 2",
                minority_class, minority_count
            )));
        }

        let mut targets = BTreeMap::new();
        targets.insert(minority_class, majority);
        self.target_counts = Some(targets);
        Ok(())
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        let targets = self
            .target_counts
            .as_ref()
            .ok_or_else(|| PipelineError::data_quality("SMOTE not fitted"))?;

        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let indices = class_indices(y);
        let counts = class_counts(y);

        let mut synthetic_rows: Vec<f64> = Vec::new();
        let mut synthetic_y: Vec<i64> = Vec::new();
        let mut n_synthetic = BTreeMap::new();

        for (&class, &target_count) in targets {
            let current_count = counts.get(&class).copied().unwrap_or(0);
            let n_to_generate = target_count.saturating_sub(current_count);
            n_synthetic.insert(class, n_to_generate);

            if n_to_generate == 0 {
                continue;
            }

            let class_idx = indices
                .get(&class)
                .ok_or_else(|| PipelineError::data_quality(format!("class {} not present", class)))?;
            let k = self.k_neighbors.min(class_idx.len() - 1).max(1);

            // neighbour lists are computed once per class row
            let neighbors: Vec<Vec<usize>> = class_idx
                .iter()
                .map(|&i| nearest_neighbors(x.row(i), x, class_idx, Some(i), k))
                .collect();

            for _ in 0..n_to_generate {
                let pos = rng.gen_range(0..class_idx.len());
                let candidates = &neighbors[pos];
                let neighbor = candidates[rng.gen_range(0..candidates.len())];
                let gap: f64 = rng.gen();

                let point = x.row(class_idx[pos]);
                let other = x.row(neighbor);
                synthetic_rows.extend(point.iter().zip(other.iter()).map(|(&p, &n)| p + gap * (n - p)));
                synthetic_y.push(class);
            }
        }

        let n_features = x.ncols();
        let synthetic_x = Array2::from_shape_vec((synthetic_y.len(), n_features), synthetic_rows)?;
        let result_x = ndarray::concatenate(Axis(0), &[x.view(), synthetic_x.view()])?;

        let mut all_y: Vec<i64> = y.to_vec();
        all_y.extend_from_slice(&synthetic_y);

        Ok(ResampleResult {
            x: result_x,
            y: Array1::from_vec(all_y),
            n_synthetic,
            n_removed: 0,
        })
    }
}
