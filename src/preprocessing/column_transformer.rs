//! Column-wise scaling into a dense feature matrix

use super::scaler::{float_column, Scaler, ScalerType};
use crate::error::{PipelineError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Z-scores one column group, min-max scales another and passes the rest
/// through. Output columns are ordered standard, min-max, remainder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    standard_columns: Vec<String>,
    min_max_columns: Vec<String>,
    standard: Scaler,
    min_max: Scaler,
    /// Pass-through columns in frame order, learned at fit
    remainder: Vec<String>,
    is_fitted: bool,
}

impl ColumnTransformer {
    pub fn new(standard_columns: Vec<String>, min_max_columns: Vec<String>) -> Self {
        Self {
            standard_columns,
            min_max_columns,
            standard: Scaler::new(ScalerType::Standard),
            min_max: Scaler::new(ScalerType::MinMax),
            remainder: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.standard.fit(df, &self.standard_columns)?;
        self.min_max.fit(df, &self.min_max_columns)?;

        self.remainder = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| {
                !self.standard_columns.contains(name) && !self.min_max_columns.contains(name)
            })
            .collect();

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale `df` and collect the output columns into a row-major matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::data_quality("column transformer is not fitted"));
        }

        let scaled = self.min_max.transform(&self.standard.transform(df)?)?;
        let names = self.output_columns();

        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(names.len());
        for name in &names {
            let series = float_column(&scaled, name)?;
            if series.null_count() > 0 {
                return Err(PipelineError::data_quality(format!(
                    "column '{}' has {} null value(s)",
                    name,
                    series.null_count()
                )));
            }
            columns.push(series.f64()?.into_no_null_iter().collect());
        }

        let n_rows = df.height();
        Ok(Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| columns[j][i]))
    }

    /// Output column names in matrix order
    pub fn output_columns(&self) -> Vec<String> {
        self.standard_columns
            .iter()
            .chain(self.min_max_columns.iter())
            .chain(self.remainder.iter())
            .cloned()
            .collect()
    }
}
