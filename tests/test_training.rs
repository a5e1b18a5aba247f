//! Integration tests for resampling and the random forest

use crosssell_pipeline::synthetic::{class_counts, Sampler, SMOTE, SMOTEENN};
use crosssell_pipeline::training::{ClassificationMetrics, Criterion, RandomForest};
use ndarray::{Array1, Array2};

/// Two overlapping-free blobs, 45 majority vs 15 minority
fn imbalanced() -> (Array2<f64>, Array1<i64>) {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for i in 0..45 {
        rows.extend_from_slice(&[(i % 9) as f64 * 0.1, (i % 5) as f64 * 0.1]);
        labels.push(0);
    }
    for i in 0..15 {
        rows.extend_from_slice(&[5.0 + (i % 5) as f64 * 0.1, 5.0 + (i % 3) as f64 * 0.1]);
        labels.push(1);
    }
    (
        Array2::from_shape_vec((60, 2), rows).unwrap(),
        Array1::from_vec(labels),
    )
}

// ============================================================================
// Resampling
// ============================================================================

#[test]
fn test_smoteenn_balances_separable_classes() {
    let (x, y) = imbalanced();
    let mut sampler = SMOTEENN::new(SMOTE::new().with_seed(11), Default::default());
    let result = sampler.fit_resample(&x, &y).unwrap();

    let counts = class_counts(&result.y);
    assert_eq!(counts[&0], 45);
    assert_eq!(counts[&1], 45);
    assert_eq!(result.n_synthetic[&1], 30);
}

#[test]
fn test_smoteenn_seeded_is_reproducible() {
    let (x, y) = imbalanced();
    let a = SMOTEENN::new(SMOTE::new().with_seed(3), Default::default())
        .fit_resample(&x, &y)
        .unwrap();
    let b = SMOTEENN::new(SMOTE::new().with_seed(3), Default::default())
        .fit_resample(&x, &y)
        .unwrap();
    assert_eq!(a.x, b.x);
    assert_eq!(a.y, b.y);
}

// ============================================================================
// Random forest
// ============================================================================

#[test]
fn test_forest_with_pipeline_hyperparameters() {
    let (x, y) = imbalanced();
    let resampled = SMOTEENN::new(SMOTE::new().with_seed(1), Default::default())
        .fit_resample(&x, &y)
        .unwrap();

    let mut forest = RandomForest::new(20)
        .with_min_samples_split(7)
        .with_min_samples_leaf(6)
        .with_max_depth(10)
        .with_criterion(Criterion::Entropy)
        .with_random_state(101);
    forest.fit(&resampled.x, &resampled.y).unwrap();

    let metrics = ClassificationMetrics::compute(&y, &forest.predict(&x).unwrap()).unwrap();
    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(metrics.f1_score, 1.0);
    assert_eq!(forest.classes(), &[0, 1]);
}

#[test]
fn test_metrics_zero_denominators() {
    let y_true = Array1::from_vec(vec![0i64, 0, 0]);
    let y_pred = Array1::from_vec(vec![0i64, 0, 0]);
    let metrics = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();
    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(metrics.precision, 0.0);
    assert_eq!(metrics.recall, 0.0);
    assert_eq!(metrics.f1_score, 0.0);
}
