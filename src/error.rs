//! Error types for the training pipeline
//!
//! Every stage returns [`PipelineError`]. The variants form a closed set of
//! kinds; each carries a message, the underlying cause when there is one, and
//! the source location where the error was raised.

use std::panic::Location;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Boxed underlying cause
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of a [`PipelineError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Connectivity,
    DataQuality,
    ModelQuality,
    Io,
    Serialization,
}

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error at {location}: {message}")]
    Config {
        message: String,
        location: &'static Location<'static>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Connectivity error at {location}: {message}")]
    Connectivity {
        message: String,
        location: &'static Location<'static>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Data quality error at {location}: {message}")]
    DataQuality {
        message: String,
        location: &'static Location<'static>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Model quality error at {location}: {message}")]
    ModelQuality {
        message: String,
        location: &'static Location<'static>,
    },

    #[error("IO error at {location}: {source}")]
    Io {
        location: &'static Location<'static>,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error at {location}: {message}")]
    Serialization {
        message: String,
        location: &'static Location<'static>,
        #[source]
        source: Option<BoxError>,
    },
}

impl PipelineError {
    #[track_caller]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            location: Location::caller(),
            source: None,
        }
    }

    #[track_caller]
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
            location: Location::caller(),
            source: None,
        }
    }

    #[track_caller]
    pub fn data_quality(message: impl Into<String>) -> Self {
        Self::DataQuality {
            message: message.into(),
            location: Location::caller(),
            source: None,
        }
    }

    #[track_caller]
    pub fn model_quality(message: impl Into<String>) -> Self {
        Self::ModelQuality {
            message: message.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            location: Location::caller(),
            source: None,
        }
    }

    /// Attach an underlying cause. No-op for variants without a slot.
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        match &mut self {
            Self::Config { source, .. }
            | Self::Connectivity { source, .. }
            | Self::DataQuality { source, .. }
            | Self::Serialization { source, .. } => *source = Some(cause.into()),
            Self::ModelQuality { .. } | Self::Io { .. } => {}
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::Connectivity { .. } => ErrorKind::Connectivity,
            Self::DataQuality { .. } => ErrorKind::DataQuality,
            Self::ModelQuality { .. } => ErrorKind::ModelQuality,
            Self::Io { .. } => ErrorKind::Io,
            Self::Serialization { .. } => ErrorKind::Serialization,
        }
    }

    /// Where the error was raised
    pub fn location(&self) -> &'static Location<'static> {
        match self {
            Self::Config { location, .. }
            | Self::Connectivity { location, .. }
            | Self::DataQuality { location, .. }
            | Self::ModelQuality { location, .. }
            | Self::Io { location, .. }
            | Self::Serialization { location, .. } => location,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io {
            location: Location::caller(),
            source: err,
        }
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    #[track_caller]
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::data_quality(err.to_string()).with_source(err)
    }
}

impl From<ndarray::ShapeError> for PipelineError {
    #[track_caller]
    fn from(err: ndarray::ShapeError) -> Self {
        PipelineError::data_quality(format!("invalid array shape: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for PipelineError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        PipelineError::serialization(err.to_string()).with_source(err)
    }
}

impl From<serde_yaml::Error> for PipelineError {
    #[track_caller]
    fn from(err: serde_yaml::Error) -> Self {
        PipelineError::serialization(err.to_string()).with_source(err)
    }
}

impl From<bincode::Error> for PipelineError {
    #[track_caller]
    fn from(err: bincode::Error) -> Self {
        PipelineError::serialization(err.to_string()).with_source(err)
    }
}

impl From<mongodb::error::Error> for PipelineError {
    #[track_caller]
    fn from(err: mongodb::error::Error) -> Self {
        PipelineError::connectivity(err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = PipelineError::data_quality("unmapped value");
        let text = err.to_string();
        assert!(text.starts_with("Data quality error at "));
        assert!(text.ends_with("unmapped value"));
        assert!(text.contains("error.rs"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PipelineError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_location_points_at_caller() {
        let line = line!() + 1;
        let err = PipelineError::model_quality("below floor");
        assert_eq!(err.location().line(), line);
        assert!(err.location().file().ends_with("error.rs"));
    }

    #[test]
    fn test_with_source_preserves_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::TimedOut, "server selection");
        let err = PipelineError::connectivity("mongo unreachable").with_source(cause);
        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("server selection"));
    }
}
