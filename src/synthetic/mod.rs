//! Class rebalancing
//!
//! - SMOTE (Synthetic Minority Over-sampling Technique)
//! - Edited Nearest Neighbours cleaning
//! - SMOTE followed by ENN

mod enn;
mod smote;
mod smote_enn;

pub use enn::EditedNearestNeighbours;
pub use smote::SMOTE;
pub use smote_enn::SMOTEENN;

use crate::error::Result;
use ndarray::{Array1, Array2, ArrayView1};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

/// Result of resampling
#[derive(Debug, Clone)]
pub struct ResampleResult {
    /// Resampled features
    pub x: Array2<f64>,
    /// Resampled labels
    pub y: Array1<i64>,
    /// Synthetic rows appended per class
    pub n_synthetic: BTreeMap<i64, usize>,
    /// Rows removed by cleaning
    pub n_removed: usize,
}

/// Trait for samplers
pub trait Sampler: Send + Sync {
    /// Fit the sampler on data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()>;

    /// Resample data
    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult>;

    /// Fit and resample in one step
    fn fit_resample(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        self.fit(x, y)?;
        self.resample(x, y)
    }
}

/// Class distribution, ordered by label
pub fn class_counts(y: &Array1<i64>) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &label in y.iter() {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Row indices for each class, ordered by label
pub fn class_indices(y: &Array1<i64>) -> BTreeMap<i64, Vec<usize>> {
    let mut indices = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        indices.entry(label).or_insert_with(Vec::new).push(i);
    }
    indices
}

/// Ordered float for BinaryHeap-based partial sort
#[derive(Debug, Clone, Copy)]
struct DistIdx(f64, usize);

impl PartialEq for DistIdx {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for DistIdx {}
impl PartialOrd for DistIdx {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistIdx {
    fn cmp(&self, other: &Self) -> Ordering {
        // ties broken by index so neighbour sets are deterministic
        self.0
            .partial_cmp(&other.0)
            .unwrap_or(Ordering::Equal)
            .then(self.1.cmp(&other.1))
    }
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(ai, bi)| (ai - bi).powi(2)).sum()
}

/// The `k` rows of `candidates` nearest to `point`, closest first.
/// `skip` excludes the query row itself.
fn nearest_neighbors(
    point: ArrayView1<f64>,
    x: &Array2<f64>,
    candidates: &[usize],
    skip: Option<usize>,
    k: usize,
) -> Vec<usize> {
    let mut heap: BinaryHeap<DistIdx> = BinaryHeap::with_capacity(k + 1);

    for &i in candidates {
        if Some(i) == skip {
            continue;
        }
        let entry = DistIdx(squared_distance(point, x.row(i)), i);
        if heap.len() < k {
            heap.push(entry);
        } else if let Some(&top) = heap.peek() {
            if entry < top {
                heap.pop();
                heap.push(entry);
            }
        }
    }

    heap.into_sorted_vec().into_iter().map(|DistIdx(_, i)| i).collect()
}
