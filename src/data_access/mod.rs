//! Document-store access
//!
//! [`DocumentSource`] exports a whole collection as a frame. The MongoDB
//! source is the production implementation; [`CsvSource`] serves offline
//! runs from a local export.

mod mongo;

pub use mongo::{documents_to_frame, MongoSource};

use crate::error::Result;
use crate::utils::read_csv;
use polars::prelude::*;
use std::path::PathBuf;

/// Literal used by the store for missing values
pub const MISSING_VALUE: &str = "na";

/// A collection-oriented record store
pub trait DocumentSource {
    /// Every record of `collection` as one frame, store identifiers removed
    /// and missing-value literals turned into nulls
    fn export_collection(&self, collection: &str) -> Result<DataFrame>;
}

/// Serves every collection from one CSV file
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for CsvSource {
    fn export_collection(&self, collection: &str) -> Result<DataFrame> {
        tracing::info!(collection, path = %self.path.display(), "exporting collection from csv");
        let df = read_csv(&self.path)?;
        let df = match df.get_column_index("_id") {
            Some(_) => df.drop("_id")?,
            None => df,
        };
        normalize_missing(&df)
    }
}

/// Null out [`MISSING_VALUE`] cells and re-infer numeric text columns
pub fn normalize_missing(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();

    for column in df.get_columns() {
        if column.dtype() != &DataType::String {
            continue;
        }
        let ca = column.as_materialized_series().str()?;
        if !ca.into_iter().any(|v| v == Some(MISSING_VALUE)) {
            continue;
        }

        let cleaned: StringChunked = ca
            .into_iter()
            .map(|v| v.filter(|s| *s != MISSING_VALUE))
            .collect();
        let cleaned = cleaned.with_name(column.name().clone()).into_series();

        // numeric columns that only looked like text because of the literal
        let reinferred = cleaned
            .strict_cast(&DataType::Int64)
            .or_else(|_| cleaned.strict_cast(&DataType::Float64))
            .unwrap_or(cleaned);
        result.with_column(reinferred)?;
    }

    Ok(result)
}
