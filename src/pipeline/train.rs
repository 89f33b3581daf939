//! Training pipeline orchestration

use serde::Serialize;
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::model::ClassificationMetrics;
use crate::stages::{
    DataIngestion, DataTransformation, DataValidation, ModelEvaluation, ModelPusher, ModelTraining,
};
use crate::storage::S3Operations;

/// Summary of one completed pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRunSummary {
    pub run_id: String,
    pub metrics: ClassificationMetrics,
    pub best_metric: f64,
    pub promoted: bool,
    /// Registry version the model was pushed as, when promoted
    pub version: Option<u32>,
}

/// Sequential orchestration of the full training pipeline:
/// ingestion → validation (gate) → transformation → training → evaluation →
/// pusher (conditional). Artifacts are passed forward by value; any stage
/// failure stops the run.
pub struct TrainingPipeline {
    config: PipelineConfig,
}

impl TrainingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<PipelineRunSummary> {
        info!("starting training pipeline");

        let ingestion = DataIngestion::new(&self.config).run().await?;

        let validation = DataValidation::new(&self.config).run(&ingestion)?;
        if !validation.status {
            error!(message = %validation.message, "validation failed, stopping pipeline");
            return Err(PipelineError::Validation(validation.message));
        }

        let transformation = DataTransformation::new(&self.config).run(&ingestion)?;
        let training = ModelTraining::new(&self.config).run(&ingestion, &transformation)?;
        let metrics = ClassificationMetrics::from_yaml_file(&training.metrics_path)?;

        let s3 = S3Operations::connect(self.config.registry.bucket.clone()).await?;
        let evaluation = ModelEvaluation::new(&self.config, &s3)
            .run(&training)
            .await?;
        let push = ModelPusher::new(&self.config, &s3)
            .run(&evaluation, &transformation, &training)
            .await?;

        info!("training pipeline completed successfully");

        Ok(PipelineRunSummary {
            run_id: ingestion.run_id,
            metrics,
            best_metric: evaluation.best_metric,
            promoted: evaluation.promote,
            version: push.map(|p| p.version),
        })
    }
}
