//! Pipeline stages
//!
//! Each stage borrows its configuration and the artifacts of earlier stages,
//! does one unit of work and returns its own artifact.

pub mod data_ingestion;
pub mod data_transformation;
pub mod data_validation;
pub mod model_evaluation;
pub mod model_pusher;
pub mod model_trainer;

pub use data_ingestion::DataIngestion;
pub use data_transformation::DataTransformation;
pub use data_validation::DataValidation;
pub use model_evaluation::ModelEvaluation;
pub use model_pusher::ModelPusher;
pub use model_trainer::ModelTrainer;
