//! Declarative column transformer
//!
//! The transformer assigns feature columns to four families — standardized,
//! min-max scaled, one-hot encoded, dropped — with every remaining column
//! passed through untouched. It is fitted on the training features only and
//! produces a dense numeric matrix with a column ordering frozen at fit time.

use std::path::Path;

use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::{OneHotEncoder, Scaler, ScalerType};
use crate::error::{PipelineError, Result};
use crate::schema::DataSchema;

/// Fitted column-wise preprocessor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTransformer {
    num_columns: Vec<String>,
    mm_columns: Vec<String>,
    categorical_columns: Vec<String>,
    drop_columns: Vec<String>,
    /// Columns in no declared family, recorded in frame order at fit
    passthrough_columns: Vec<String>,
    standard: Scaler,
    minmax: Scaler,
    encoder: OneHotEncoder,
    /// Output ordering: num, mm, one-hot expansions, passthrough
    output_columns: Vec<String>,
    is_fitted: bool,
}

impl FeatureTransformer {
    /// Build an unfitted transformer from the declared schema families.
    /// The target column never participates in any family.
    pub fn from_schema(schema: &DataSchema, target_column: &str) -> Self {
        let keep = |names: &[String]| -> Vec<String> {
            names
                .iter()
                .filter(|n| n.as_str() != target_column)
                .cloned()
                .collect()
        };

        Self {
            num_columns: keep(&schema.num_columns),
            mm_columns: keep(&schema.mm_columns),
            categorical_columns: keep(&schema.categorical_columns),
            drop_columns: keep(&schema.drop_columns),
            passthrough_columns: Vec::new(),
            standard: Scaler::new(ScalerType::Standard),
            minmax: Scaler::new(ScalerType::MinMax),
            encoder: OneHotEncoder::new(),
            output_columns: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit on training features only
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let df = cast_numeric_to_f64(df)?;

        if !self.num_columns.is_empty() {
            let cols: Vec<&str> = self.num_columns.iter().map(|s| s.as_str()).collect();
            self.standard.fit(&df, &cols)?;
        }

        if !self.mm_columns.is_empty() {
            let cols: Vec<&str> = self.mm_columns.iter().map(|s| s.as_str()).collect();
            self.minmax.fit(&df, &cols)?;
        }

        if !self.categorical_columns.is_empty() {
            let cols: Vec<&str> = self.categorical_columns.iter().map(|s| s.as_str()).collect();
            self.encoder.fit(&df, &cols)?;
        }

        // Everything not in a family and not dropped passes through, in
        // frame order.
        self.passthrough_columns = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .filter(|name| {
                !self.num_columns.contains(name)
                    && !self.mm_columns.contains(name)
                    && !self.categorical_columns.contains(name)
                    && !self.drop_columns.contains(name)
            })
            .collect();

        self.output_columns = self.build_output_columns()?;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform features into a dense matrix in the frozen output ordering.
    /// Declared drop columns are tolerated absent.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut encoded = cast_numeric_to_f64(df)?;
        if !self.num_columns.is_empty() {
            encoded = self.standard.transform(&encoded)?;
        }
        if !self.mm_columns.is_empty() {
            encoded = self.minmax.transform(&encoded)?;
        }
        if !self.categorical_columns.is_empty() {
            encoded = self.encoder.transform(&encoded)?;
        }

        let n_rows = encoded.height();
        let columns: Vec<Vec<f64>> = self
            .output_columns
            .iter()
            .map(|name| numeric_values(&encoded, name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Array2::from_shape_fn(
            (n_rows, columns.len()),
            |(r, c)| columns[c][r],
        ))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// The frozen output column ordering
    pub fn output_columns(&self) -> &[String] {
        &self.output_columns
    }

    /// Save the fitted transformer to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a fitted transformer from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let transformer: Self = serde_json::from_str(&json)?;
        Ok(transformer)
    }

    /// Deserialize a fitted transformer from raw JSON bytes
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let transformer: Self = serde_json::from_slice(bytes)?;
        Ok(transformer)
    }

    fn build_output_columns(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        names.extend(self.num_columns.iter().cloned());
        names.extend(self.mm_columns.iter().cloned());

        for col in &self.categorical_columns {
            let vocabulary = self
                .encoder
                .categories(col)
                .ok_or_else(|| PipelineError::FeatureNotFound(col.clone()))?;
            for category in vocabulary {
                names.push(format!("{}_{}", col, category));
            }
        }

        names.extend(self.passthrough_columns.iter().cloned());
        Ok(names)
    }
}

/// Cast all integer and Float32 columns to Float64 for consistent processing
fn cast_numeric_to_f64(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    for col in df.get_columns() {
        match col.dtype() {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32 => {
                let casted = col
                    .cast(&DataType::Float64)
                    .map_err(|e| PipelineError::Data(e.to_string()))?;
                result = result
                    .with_column(casted)
                    .map_err(|e| PipelineError::Data(e.to_string()))?
                    .clone();
            }
            _ => {}
        }
    }
    Ok(result)
}

fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| PipelineError::Data(e.to_string()))?;
    Ok(casted
        .f64()
        .map_err(|e| PipelineError::Data(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect())
}
