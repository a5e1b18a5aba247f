//! Records passed between pipeline stages

pub mod artifact;
pub mod estimator;

pub use artifact::*;
pub use estimator::ModelBundle;
