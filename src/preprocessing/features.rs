//! Feature engineering ahead of scaling
//!
//! Maps `Gender` to 0/1, drops the identifier column, one-hot encodes the
//! remaining string columns and normalises the `Vehicle_Age` dummy names.
//! One-hot categories are learned by [`FeatureEngineer::fit`] and replayed
//! on every later frame so train and test produce the same columns.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const GENDER_COLUMN: &str = "Gender";

/// Dummy columns renamed after encoding
const DUMMY_RENAMES: [(&str, &str); 2] = [
    ("Vehicle_Age_< 1 Year", "Vehicle_Age_lt_1_Year"),
    ("Vehicle_Age_> 2 Years", "Vehicle_Age_gt_2_Years"),
];

/// Dummy columns forced to integer
const INTEGER_DUMMIES: [&str; 3] = [
    "Vehicle_Age_lt_1_Year",
    "Vehicle_Age_gt_2_Years",
    "Vehicle_Damage_Yes",
];

fn map_gender_value(value: Option<&str>) -> Result<i64> {
    match value {
        Some("Female") => Ok(0),
        Some("Male") => Ok(1),
        Some(other) => Err(PipelineError::data_quality(format!(
            "unmapped {} value '{}'",
            GENDER_COLUMN, other
        ))),
        None => Err(PipelineError::data_quality(format!(
            "null {} value",
            GENDER_COLUMN
        ))),
    }
}

/// Replace `Gender` with its fixed integer code
pub fn map_gender_column(df: &DataFrame) -> Result<DataFrame> {
    let column = df.column(GENDER_COLUMN).map_err(|_| {
        PipelineError::data_quality(format!("column '{}' not found", GENDER_COLUMN))
    })?;
    let ca = column.as_materialized_series().str().map_err(|e| {
        PipelineError::data_quality(format!("column '{}' is not text", GENDER_COLUMN))
            .with_source(e)
    })?;

    let codes = ca
        .into_iter()
        .map(map_gender_value)
        .collect::<Result<Vec<i64>>>()?;

    let mut result = df.clone();
    result.with_column(Series::new(GENDER_COLUMN.into(), codes))?;
    Ok(result)
}

/// Fitted one-hot encoding of one text column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OneHotColumn {
    name: String,
    /// Sorted distinct values seen at fit; the first is the dropped baseline
    categories: Vec<String>,
}

impl OneHotColumn {
    fn dummy_name(&self, category: &str) -> String {
        format!("{}_{}", self.name, category)
    }

    fn encode(&self, series: &Series) -> Result<Vec<Series>> {
        let ca = series.str().map_err(|e| {
            PipelineError::data_quality(format!("column '{}' is not text", self.name))
                .with_source(e)
        })?;

        let unseen = ca
            .into_iter()
            .flatten()
            .filter(|v| !self.categories.iter().any(|c| c == v))
            .count();
        if unseen > 0 {
            warn!(column = %self.name, rows = unseen, "values not seen at fit encode as baseline");
        }

        Ok(self
            .categories
            .iter()
            .skip(1)
            .map(|category| {
                let values: Vec<i64> = ca
                    .into_iter()
                    .map(|v| i64::from(v == Some(category.as_str())))
                    .collect();
                Series::new(self.dummy_name(category).into(), values)
            })
            .collect())
    }
}

/// Stateful feature engineering step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureEngineer {
    drop_column: Option<String>,
    encoders: Vec<OneHotColumn>,
    is_fitted: bool,
}

impl FeatureEngineer {
    pub fn new(drop_column: Option<String>) -> Self {
        Self {
            drop_column,
            encoders: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn one-hot categories from `df`
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let prepared = self.map_and_drop(df)?;

        let mut encoders = Vec::new();
        for column in prepared.get_columns() {
            if column.dtype() != &DataType::String {
                continue;
            }
            let ca = column.as_materialized_series().str()?;
            let mut categories: Vec<String> = ca.into_iter().flatten().map(str::to_string).collect();
            categories.sort();
            categories.dedup();

            debug!(column = %column.name(), categories = ?categories, "fitted one-hot categories");
            encoders.push(OneHotColumn {
                name: column.name().to_string(),
                categories,
            });
        }

        self.encoders = encoders;
        self.is_fitted = true;
        Ok(self)
    }

    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::data_quality("feature engineer is not fitted"));
        }

        let mut result = self.map_and_drop(df)?;

        let mut dummies = Vec::new();
        for encoder in &self.encoders {
            let column = result.column(&encoder.name).map_err(|_| {
                PipelineError::data_quality(format!("column '{}' not found", encoder.name))
            })?;
            dummies.extend(encoder.encode(column.as_materialized_series())?);
        }
        for encoder in &self.encoders {
            result = result.drop(&encoder.name)?;
        }
        for dummy in dummies {
            result.with_column(dummy)?;
        }

        for (from, to) in DUMMY_RENAMES {
            if result.get_column_index(from).is_some() {
                result.rename(from, to.into())?;
            }
        }
        for name in INTEGER_DUMMIES {
            if let Ok(column) = result.column(name) {
                let cast = column.as_materialized_series().cast(&DataType::Int64)?;
                result.with_column(cast)?;
            }
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    fn map_and_drop(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = map_gender_column(df)?;
        if let Some(drop) = &self.drop_column {
            if result.get_column_index(drop).is_some() {
                result = result.drop(drop)?;
            }
        }
        Ok(result)
    }
}
