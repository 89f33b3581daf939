//! Model training primitives
//!
//! Decision trees, the random-forest ensemble, and classification metrics.

mod forest;
mod metrics;
mod tree;

pub use forest::RandomForestClassifier;
pub use metrics::ClassificationMetrics;
pub use tree::{Criterion, DecisionTree, TreeNode};

use ndarray::{Array1, Array2};
use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Extract named columns from a DataFrame into a row-major `Array2<f64>`
/// (cast through Float64, nulls as 0.0).
pub fn to_feature_matrix(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::FeatureNotFound(col_name.clone()))?;
            let casted = column
                .cast(&DataType::Float64)
                .map_err(|e| PipelineError::Data(e.to_string()))?;
            let values: Vec<f64> = casted
                .f64()
                .map_err(|e| PipelineError::Data(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

/// Extract a single named column as `Array1<f64>`
pub fn to_target_vector(df: &DataFrame, col_name: &str) -> Result<Array1<f64>> {
    let column = df
        .column(col_name)
        .map_err(|_| PipelineError::FeatureNotFound(col_name.to_string()))?;
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
