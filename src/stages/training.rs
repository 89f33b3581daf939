//! Model training stage

use tracing::{error, info};

use crate::artifact::{IngestionArtifact, TrainingArtifact, TransformationArtifact};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::model::{
    to_feature_matrix, to_target_vector, ClassificationMetrics, RandomForestClassifier,
};
use crate::storage::read_csv;

/// Trains the configured ensemble classifier on the transformed training
/// set and evaluates it on the transformed test set.
pub struct ModelTraining<'a> {
    config: &'a PipelineConfig,
}

impl<'a> ModelTraining<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    fn build_model(&self) -> RandomForestClassifier {
        let params = &self.config.forest;
        let mut model = RandomForestClassifier::new(params.n_estimators)
            .with_min_samples_split(params.min_samples_split)
            .with_min_samples_leaf(params.min_samples_leaf)
            .with_criterion(params.criterion)
            .with_random_state(params.random_state);
        if let Some(depth) = params.max_depth {
            model = model.with_max_depth(depth);
        }
        model
    }

    pub fn run(
        &self,
        ingestion: &IngestionArtifact,
        transformation: &TransformationArtifact,
    ) -> Result<TrainingArtifact> {
        self.run_inner(ingestion, transformation).map_err(|e| {
            error!(error = %e, "model training failed");
            e
        })
    }

    fn run_inner(
        &self,
        ingestion: &IngestionArtifact,
        transformation: &TransformationArtifact,
    ) -> Result<TrainingArtifact> {
        info!("starting model training");
        let target = self.config.target_column.as_str();

        let train_df = read_csv(&transformation.transformed_train_path)?;
        let test_df = read_csv(&transformation.transformed_test_path)?;

        let feature_names: Vec<String> = train_df
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != target)
            .map(|s| s.to_string())
            .collect();

        let x_train = to_feature_matrix(&train_df, &feature_names)?;
        let y_train = to_target_vector(&train_df, target)?;
        let x_test = to_feature_matrix(&test_df, &feature_names)?;
        let y_test = to_target_vector(&test_df, target)?;

        let mut model = self.build_model();
        model.fit(&x_train, &y_train)?;
        info!(trees = model.n_trees(), "model training completed");

        let y_pred = model.predict(&x_test)?;
        let metrics = ClassificationMetrics::compute(&y_test, &y_pred);
        info!(
            accuracy = metrics.accuracy,
            f1_score = metrics.f1_score,
            precision = metrics.precision,
            recall = metrics.recall,
            "model evaluation metrics"
        );

        let model_path = self.config.layout.model_path(&ingestion.run_id);
        if let Some(parent) = model_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        model.save(&model_path)?;

        let metrics_path = self.config.layout.metrics_path(&ingestion.run_id);
        if let Some(parent) = metrics_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        metrics.to_yaml_file(&metrics_path)?;

        info!(model = %model_path.display(), "model saved");

        Ok(TrainingArtifact {
            model_path,
            metrics_path,
        })
    }
}
