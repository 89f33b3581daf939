//! Stage artifacts
//!
//! Each stage returns an immutable value record referencing the durable
//! files it produced. Records are created once per run and never mutated;
//! every stage can re-run as an independent process from its predecessor's
//! declared paths alone.

use std::path::PathBuf;

use serde::Serialize;

/// Output of data ingestion
#[derive(Debug, Clone, Serialize)]
pub struct IngestionArtifact {
    /// Timestamp tag naming this run's artifact directory
    pub run_id: String,
    pub feature_store_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Output of data validation
#[derive(Debug, Clone, Serialize)]
pub struct ValidationArtifact {
    pub status: bool,
    pub message: String,
    pub report_path: PathBuf,
}

/// Output of data transformation
#[derive(Debug, Clone, Serialize)]
pub struct TransformationArtifact {
    pub transformed_train_path: PathBuf,
    pub transformed_test_path: PathBuf,
    pub preprocessor_path: PathBuf,
    pub output_columns_path: PathBuf,
}

/// Output of model training
#[derive(Debug, Clone, Serialize)]
pub struct TrainingArtifact {
    pub model_path: PathBuf,
    pub metrics_path: PathBuf,
}

/// Output of model evaluation
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationArtifact {
    /// Whether the candidate should be pushed to production
    pub promote: bool,
    pub candidate_model_path: PathBuf,
    /// Maximum of candidate and production primary metric, kept for audit
    pub best_metric: f64,
}

/// Output of the model pusher
#[derive(Debug, Clone, Serialize)]
pub struct PushArtifact {
    pub version: u32,
    pub versioned_keys: Vec<String>,
    pub production_keys: Vec<String>,
}
