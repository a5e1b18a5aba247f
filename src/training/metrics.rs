//! Classification metrics

use crate::error::{PipelineError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Label treated as the positive class
pub const POSITIVE_CLASS: i64 = 1;

/// Binary classification metrics; zero denominators give 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub n_samples: usize,
}

impl ClassificationMetrics {
    pub fn compute(y_true: &Array1<i64>, y_pred: &Array1<i64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(PipelineError::data_quality(format!(
                "{} labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }

        let n = y_true.len();
        let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
        let accuracy = if n > 0 { correct as f64 / n as f64 } else { 0.0 };

        let (tp, fp, _, fn_) = confusion_counts(y_true, y_pred);

        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok(Self {
            accuracy,
            precision,
            recall,
            f1_score,
            n_samples: n,
        })
    }
}

/// Binary F1 for the positive class
pub fn f1_score(y_true: &Array1<i64>, y_pred: &Array1<i64>) -> Result<f64> {
    Ok(ClassificationMetrics::compute(y_true, y_pred)?.f1_score)
}

/// `(tp, fp, tn, fn)` with [`POSITIVE_CLASS`] as positive
fn confusion_counts(y_true: &Array1<i64>, y_pred: &Array1<i64>) -> (usize, usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut tn = 0;
    let mut fn_ = 0;

    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        match (t == POSITIVE_CLASS, p == POSITIVE_CLASS) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    (tp, fp, tn, fn_)
}
