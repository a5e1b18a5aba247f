//! Declared dataset schema

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Expected columns and scaling groups, read from `config/schema.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Single-entry `name: dtype` maps, in declared order
    pub columns: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    pub numerical_columns: Vec<String>,
    #[serde(default)]
    pub categorical_columns: Vec<String>,
    /// Identifier column removed before encoding
    #[serde(default)]
    pub drop_columns: Option<String>,
    /// Columns z-score scaled
    #[serde(default)]
    pub num_features: Vec<String>,
    /// Columns min-max scaled
    #[serde(default)]
    pub mm_columns: Vec<String>,
}

impl SchemaConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("cannot read schema file {}", path.display()))
                .with_source(e)
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            PipelineError::config(format!("invalid schema: {}", e)).with_source(e)
        })
    }
}
