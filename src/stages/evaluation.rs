//! Model evaluation stage

use tracing::{error, info};

use crate::artifact::{EvaluationArtifact, TrainingArtifact};
use crate::config::{PipelineConfig, METRICS_OBJECT};
use crate::error::{PipelineError, Result};
use crate::model::ClassificationMetrics;
use crate::storage::S3Operations;

/// Promotion rule: with no production metric the candidate promotes
/// unconditionally; otherwise it promotes iff it strictly exceeds
/// production. Returns the decision and the best of the two scores.
pub fn promotion_decision(candidate: f64, production: Option<f64>) -> (bool, f64) {
    match production {
        None => (true, candidate),
        Some(prod) => (candidate > prod, candidate.max(prod)),
    }
}

/// Compares the candidate's primary metric against the currently promoted
/// production model's metric.
pub struct ModelEvaluation<'a> {
    config: &'a PipelineConfig,
    s3: &'a S3Operations,
}

impl<'a> ModelEvaluation<'a> {
    pub fn new(config: &'a PipelineConfig, s3: &'a S3Operations) -> Self {
        Self { config, s3 }
    }

    pub async fn run(&self, training: &TrainingArtifact) -> Result<EvaluationArtifact> {
        self.run_inner(training).await.map_err(|e| {
            error!(error = %e, "model evaluation failed");
            e
        })
    }

    async fn run_inner(&self, training: &TrainingArtifact) -> Result<EvaluationArtifact> {
        info!("starting model evaluation");
        let metric_name = self.config.registry.primary_metric.as_str();

        let candidate_metrics = ClassificationMetrics::from_yaml_file(&training.metrics_path)?;
        let candidate = candidate_metrics.get(metric_name).ok_or_else(|| {
            PipelineError::Evaluation(format!("unknown primary metric: {}", metric_name))
        })?;
        info!(metric = metric_name, score = candidate, "candidate model score");

        let production_key = self.config.registry.production_key(METRICS_OBJECT);
        let production = if self.s3.exists(&production_key).await? {
            let prod_metrics: ClassificationMetrics = self.s3.read_yaml(&production_key).await?;
            let score = prod_metrics.get(metric_name).ok_or_else(|| {
                PipelineError::Evaluation(format!(
                    "production metrics lack primary metric: {}",
                    metric_name
                ))
            })?;
            info!(metric = metric_name, score, "production model score");
            Some(score)
        } else {
            info!("no production model found, accepting first model");
            None
        };

        let (promote, best_metric) = promotion_decision(candidate, production);
        info!(promote, best_metric, "model comparison result");

        Ok(EvaluationArtifact {
            promote,
            candidate_model_path: training.model_path.clone(),
            best_metric,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_always_promotes() {
        let (promote, best) = promotion_decision(0.1, None);
        assert!(promote);
        assert_eq!(best, 0.1);
    }

    #[test]
    fn test_strictly_better_promotes() {
        let (promote, best) = promotion_decision(0.9, Some(0.8));
        assert!(promote);
        assert_eq!(best, 0.9);
    }

    #[test]
    fn test_tie_does_not_promote() {
        let (promote, best) = promotion_decision(0.8, Some(0.8));
        assert!(!promote);
        assert_eq!(best, 0.8);
    }

    #[test]
    fn test_worse_keeps_production_as_best() {
        let (promote, best) = promotion_decision(0.7, Some(0.8));
        assert!(!promote);
        assert_eq!(best, 0.8);
    }
}
