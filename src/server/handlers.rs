//! Request handlers

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use tracing::info;

use super::error::{Result, ServerError};
use super::state::AppState;
use crate::pipeline::{InsuranceInput, Prediction, PipelineRunSummary, TrainingPipeline};

/// POST /predict — single-record inference
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(input): Json<InsuranceInput>,
) -> Result<Json<Prediction>> {
    let result = state.predictor.predict(&input)?;
    Ok(Json(result))
}

/// POST /train — run the full training pipeline. Concurrent runs are
/// rejected with 409.
pub async fn train(State(state): State<Arc<AppState>>) -> Result<Json<PipelineRunSummary>> {
    let _guard = state
        .training
        .try_lock()
        .map_err(|_| ServerError::TrainingInProgress)?;

    info!("training run triggered via API");
    let pipeline = TrainingPipeline::new(state.config.clone());
    let summary = pipeline.run().await?;
    Ok(Json(summary))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
