//! One-hot encoding with unknown-category tolerance

use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// One-hot encoder for categorical columns.
///
/// The category vocabulary is frozen at fit time; categories unseen during
/// fit encode as all-zero rows instead of failing. Output columns are named
/// `{column}_{category}` with categories in sorted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    // column name -> sorted category vocabulary
    categories: HashMap<String, Vec<String>>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            categories: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the encoder, recording each column's category vocabulary
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self.categories.clear();

        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::FeatureNotFound(col_name.to_string()))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| PipelineError::Data(e.to_string()))?;

            let mut vocabulary: Vec<String> =
                ca.into_iter().flatten().map(|v| v.to_string()).collect();
            vocabulary.sort();
            vocabulary.dedup();

            self.categories.insert(col_name.to_string(), vocabulary);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform: replace each fitted column with one 0/1 column per known
    /// category, appended to the frame.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut result = df.clone();

        for col_name in &self.columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::FeatureNotFound(col_name.clone()))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| PipelineError::Data(e.to_string()))?;

            let vocabulary = self
                .categories
                .get(col_name)
                .ok_or_else(|| PipelineError::FeatureNotFound(col_name.clone()))?;

            for category in vocabulary {
                let new_col_name = format!("{}_{}", col_name, category);
                let values: Vec<f64> = ca
                    .into_iter()
                    .map(|v| if v == Some(category.as_str()) { 1.0 } else { 0.0 })
                    .collect();

                let new_series = Series::new(new_col_name.into(), values);
                result = result
                    .with_column(new_series)
                    .map_err(|e| PipelineError::Data(e.to_string()))?
                    .clone();
            }

            result = result
                .drop(col_name)
                .map_err(|e| PipelineError::Data(e.to_string()))?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Sorted category vocabulary of a fitted column
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.categories.get(column).map(|v| v.as_slice())
    }

    /// Fitted column names, in fit order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> DataFrame {
        DataFrame::new(vec![
            Series::new("city".into(), &["NYC", "LA", "NYC", "SF"]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_onehot_encoding() {
        let df = cities();
        let mut encoder = OneHotEncoder::new();
        let result = encoder.fit_transform(&df, &["city"]).unwrap();

        // Original column dropped, one column per category added
        assert!(result.column("city").is_err());
        assert_eq!(result.width(), 3);

        let nyc = result.column("city_NYC").unwrap().f64().unwrap();
        let values: Vec<f64> = nyc.into_iter().flatten().collect();
        assert_eq!(values, vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let df = cities();
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["city"]).unwrap();

        assert_eq!(
            encoder.categories("city").unwrap(),
            &["LA".to_string(), "NYC".to_string(), "SF".to_string()]
        );
    }

    #[test]
    fn test_unknown_category_encodes_as_zeros() {
        let df = cities();
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["city"]).unwrap();

        let unseen = DataFrame::new(vec![
            Series::new("city".into(), &["Chicago"]).into(),
        ])
        .unwrap();

        let result = encoder.transform(&unseen).unwrap();
        for name in ["city_LA", "city_NYC", "city_SF"] {
            let col = result.column(name).unwrap().f64().unwrap();
            assert_eq!(col.get(0), Some(0.0));
        }
    }
}
