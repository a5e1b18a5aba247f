//! Model training module
//!
//! - Decision trees and Random Forests
//! - Binary classification metrics

pub mod decision_tree;
pub mod metrics;
pub mod random_forest;

pub use decision_tree::{Criterion, DecisionTree};
pub use metrics::{f1_score, ClassificationMetrics, POSITIVE_CLASS};
pub use random_forest::RandomForest;
