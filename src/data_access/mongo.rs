//! MongoDB-backed document source

use super::{normalize_missing, DocumentSource};
use crate::config::ConnectionSettings;
use crate::error::{PipelineError, Result};
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::sync::{Client, Database};
use polars::prelude::*;

const ID_FIELD: &str = "_id";

/// Connection to one database of a MongoDB deployment
#[derive(Clone)]
pub struct MongoSource {
    database: Database,
}

impl MongoSource {
    /// Connect using the configured URL. The driver is lazy, so an unreachable
    /// server surfaces on the first export after the selection timeout.
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let mut options = ClientOptions::parse(&settings.mongodb_url)
            .run()
            .map_err(|e| PipelineError::connectivity("invalid MongoDB connection string").with_source(e))?;
        options.server_selection_timeout = Some(settings.server_selection_timeout);

        let client = Client::with_options(options)?;
        tracing::info!(database = %settings.database_name, "MongoDB client created");

        Ok(Self {
            database: client.database(&settings.database_name),
        })
    }
}

impl DocumentSource for MongoSource {
    fn export_collection(&self, collection: &str) -> Result<DataFrame> {
        tracing::info!(database = %self.database.name(), collection, "exporting collection");

        let cursor = self
            .database
            .collection::<Document>(collection)
            .find(doc! {})
            .run()
            .map_err(|e| {
                PipelineError::connectivity(format!("failed to query collection '{}'", collection))
                    .with_source(e)
            })?;

        let documents = cursor.collect::<std::result::Result<Vec<_>, _>>()?;
        let df = documents_to_frame(&documents)?;
        tracing::info!(rows = df.height(), columns = df.width(), "collection exported");
        Ok(df)
    }
}

/// Column shape inferred from every non-null cell of one field
#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldType {
    Int,
    Float,
    Bool,
    Text,
}

impl FieldType {
    fn of(value: &Bson) -> Option<Self> {
        match value {
            Bson::Null | Bson::Undefined => None,
            Bson::Int32(_) | Bson::Int64(_) => Some(Self::Int),
            Bson::Double(_) => Some(Self::Float),
            Bson::Boolean(_) => Some(Self::Bool),
            _ => Some(Self::Text),
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Self::Float,
            _ => Self::Text,
        }
    }
}

fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        _ => None,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn as_text(value: &Bson) -> Option<String> {
    match value {
        Bson::Null | Bson::Undefined => None,
        Bson::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Flatten documents into a frame. Fields keep first-seen order, the store
/// identifier is dropped and missing-value literals become nulls.
pub fn documents_to_frame(documents: &[Document]) -> Result<DataFrame> {
    let mut fields: Vec<String> = Vec::new();
    for document in documents {
        for key in document.keys() {
            if key != ID_FIELD && !fields.iter().any(|f| f == key) {
                fields.push(key.clone());
            }
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(fields.len());
    for field in &fields {
        let cells: Vec<Option<&Bson>> = documents.iter().map(|d| d.get(field)).collect();
        let field_type = cells
            .iter()
            .flatten()
            .filter_map(|v| FieldType::of(v))
            .reduce(FieldType::merge)
            .unwrap_or(FieldType::Text);

        let name: PlSmallStr = field.as_str().into();
        let series = match field_type {
            FieldType::Int => {
                let values: Vec<Option<i64>> = cells.iter().map(|c| c.and_then(as_i64)).collect();
                Series::new(name, values)
            }
            FieldType::Float => {
                let values: Vec<Option<f64>> = cells.iter().map(|c| c.and_then(as_f64)).collect();
                Series::new(name, values)
            }
            FieldType::Bool => {
                let values: Vec<Option<bool>> =
                    cells.iter().map(|c| c.and_then(Bson::as_bool)).collect();
                Series::new(name, values)
            }
            FieldType::Text => {
                let values: Vec<Option<String>> =
                    cells.iter().map(|c| c.and_then(as_text)).collect();
                Series::new(name, values)
            }
        };
        columns.push(series.into());
    }

    let df = DataFrame::new(columns)?;
    normalize_missing(&df)
}
