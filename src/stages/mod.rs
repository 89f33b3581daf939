//! Pipeline stages
//!
//! One module per stage, executed strictly sequentially by the training
//! pipeline, each consuming its predecessor's artifact.

mod evaluation;
mod ingestion;
mod pusher;
mod training;
mod transformation;
mod validation;

pub use evaluation::{promotion_decision, ModelEvaluation};
pub use ingestion::{split_train_test, DataIngestion};
pub use pusher::{next_version, ModelPusher};
pub use training::ModelTraining;
pub use transformation::{DataTransformation, TransformedColumns};
pub use validation::{check_allowed_columns, check_column_count, DataValidation, ValidationReport};
