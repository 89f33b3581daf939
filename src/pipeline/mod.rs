//! Pipeline orchestration: the sequential training run and the loaded-once
//! prediction service.

mod predict;
mod train;

pub use predict::{InsuranceInput, Prediction, Predictor};
pub use train::{PipelineRunSummary, TrainingPipeline};
