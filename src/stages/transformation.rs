//! Data transformation stage

use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::artifact::{IngestionArtifact, TransformationArtifact};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::model::to_target_vector;
use crate::preprocessing::FeatureTransformer;
use crate::sampling::{Sampler, SmoteEnn};
use crate::schema::DataSchema;
use crate::storage::{read_csv, write_csv};

/// Output-column ordering record persisted next to the transformer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformedColumns {
    pub transformed_columns: Vec<String>,
}

/// Fits the column transformer on the train split only, transforms both
/// splits, rebalances the training class distribution, and persists the
/// transformed arrays plus the fitted transformer.
pub struct DataTransformation<'a> {
    config: &'a PipelineConfig,
}

impl<'a> DataTransformation<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, ingestion: &IngestionArtifact) -> Result<TransformationArtifact> {
        self.run_inner(ingestion).map_err(|e| {
            error!(error = %e, "data transformation failed");
            e
        })
    }

    fn run_inner(&self, ingestion: &IngestionArtifact) -> Result<TransformationArtifact> {
        info!("starting data transformation");
        let schema = DataSchema::from_yaml_file(&self.config.schema_path)?;
        let target = self.config.target_column.as_str();

        let train_df = read_csv(&ingestion.train_path)?;
        let test_df = read_csv(&ingestion.test_path)?;

        let y_train = to_label_vector(&train_df, target)?;
        let y_test = to_label_vector(&test_df, target)?;
        let x_train_df = train_df.drop(target)?;
        let x_test_df = test_df.drop(target)?;

        // Fit on train only so no test-set statistic reaches the transformer
        let mut transformer = FeatureTransformer::from_schema(&schema, target);
        let x_train = transformer.fit_transform(&x_train_df)?;
        let x_test = transformer.transform(&x_test_df)?;
        info!(
            features = transformer.output_columns().len(),
            "preprocessing transformations applied"
        );

        // Rebalance the training split only; the test split keeps its
        // natural class distribution
        let mut sampler = SmoteEnn::new().with_seed(self.config.sampler_seed);
        let resampled = sampler.fit_resample(&x_train, &y_train)?;
        info!(
            before = y_train.len(),
            after = resampled.y.len(),
            "class rebalancing applied to training set"
        );

        let train_out = assemble_frame(
            &resampled.x,
            transformer.output_columns(),
            &resampled.y,
            target,
        )?;
        let test_out = assemble_frame(&x_test, transformer.output_columns(), &y_test, target)?;

        let transformed_train_path = self
            .config
            .layout
            .transformed_train_path(&ingestion.run_id);
        let transformed_test_path = self.config.layout.transformed_test_path(&ingestion.run_id);
        write_csv(&train_out, &transformed_train_path)?;
        write_csv(&test_out, &transformed_test_path)?;

        let preprocessor_path = self.config.layout.preprocessor_path(&ingestion.run_id);
        if let Some(parent) = preprocessor_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        transformer.save(&preprocessor_path)?;

        let output_columns_path = self.config.layout.output_columns_path(&ingestion.run_id);
        if let Some(parent) = output_columns_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let ordering = TransformedColumns {
            transformed_columns: transformer.output_columns().to_vec(),
        };
        std::fs::write(&output_columns_path, serde_yaml::to_string(&ordering)?)?;

        info!("transformed data and preprocessing object saved");

        Ok(TransformationArtifact {
            transformed_train_path,
            transformed_test_path,
            preprocessor_path,
            output_columns_path,
        })
    }
}

fn to_label_vector(df: &DataFrame, target: &str) -> Result<Array1<i64>> {
    let values = to_target_vector(df, target)?;
    Ok(values.mapv(|v| v.round() as i64))
}

/// Features plus the label column appended, under the output column names
fn assemble_frame(
    x: &Array2<f64>,
    names: &[String],
    y: &Array1<i64>,
    target: &str,
) -> Result<DataFrame> {
    if x.ncols() != names.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("{} columns", names.len()),
            actual: format!("{} columns", x.ncols()),
        });
    }

    let mut columns: Vec<Column> = names
        .iter()
        .enumerate()
        .map(|(j, name)| Series::new(name.as_str().into(), x.column(j).to_vec()).into())
        .collect();
    columns.push(Series::new(target.into(), y.iter().copied().collect::<Vec<i64>>()).into());

    DataFrame::new(columns).map_err(|e| PipelineError::Transformation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_assemble_frame_appends_label_last() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let names = vec!["a".to_string(), "b".to_string()];
        let y = array![0i64, 1];

        let df = assemble_frame(&x, &names, &y, "Response").unwrap();
        assert_eq!(df.width(), 3);
        assert_eq!(
            df.get_column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
            vec!["a", "b", "Response"]
        );
        assert_eq!(df.column("Response").unwrap().i64().unwrap().get(1), Some(1));
    }

    #[test]
    fn test_assemble_frame_shape_mismatch() {
        let x = array![[1.0, 2.0]];
        let names = vec!["a".to_string()];
        let y = array![0i64];
        assert!(assemble_frame(&x, &names, &y, "Response").is_err());
    }
}
