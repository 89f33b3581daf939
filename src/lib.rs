//! Crosssell - insurance cross-sell prediction pipeline
//!
//! An MLOps pipeline for predicting vehicle-insurance purchases: ingest
//! application records from a document store, validate the schema, transform
//! features, train a random-forest classifier, evaluate it against the
//! production model, and promote winners to an object-store registry, with a
//! thin HTTP endpoint for inference.
//!
//! # Modules
//!
//! ## Pipeline
//! - [`stages`] - Ingestion, validation, transformation, training,
//!   evaluation, pusher
//! - [`pipeline`] - Sequential orchestration and the prediction service core
//! - [`artifact`] - Immutable per-stage result records
//!
//! ## ML primitives
//! - [`preprocessing`] - Scaling, one-hot encoding, the column transformer
//! - [`sampling`] - SMOTE, ENN, and their combination
//! - [`model`] - Decision tree, random forest, classification metrics
//!
//! ## Infrastructure
//! - [`config`] - Immutable environment-derived configuration
//! - [`schema`] - Declared dataset schema
//! - [`storage`] - Document store, object store, CSV files
//! - [`server`] - HTTP service

pub mod artifact;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod preprocessing;
pub mod sampling;
pub mod schema;
pub mod server;
pub mod stages;
pub mod storage;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::artifact::{
        EvaluationArtifact, IngestionArtifact, PushArtifact, TrainingArtifact,
        TransformationArtifact, ValidationArtifact,
    };
    pub use crate::config::PipelineConfig;
    pub use crate::error::{PipelineError, Result};
    pub use crate::model::{ClassificationMetrics, Criterion, RandomForestClassifier};
    pub use crate::pipeline::{InsuranceInput, Prediction, Predictor, TrainingPipeline};
    pub use crate::preprocessing::FeatureTransformer;
    pub use crate::sampling::{Sampler, SmoteEnn};
    pub use crate::schema::DataSchema;
}
