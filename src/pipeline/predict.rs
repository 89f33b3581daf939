//! Prediction pipeline
//!
//! Loads the production model and preprocessor from the registry alias once,
//! then serves single-row predictions.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{RegistryConfig, MODEL_OBJECT, PREPROCESSOR_OBJECT};
use crate::error::{PipelineError, Result};
use crate::model::RandomForestClassifier;
use crate::preprocessing::FeatureTransformer;
use crate::storage::S3Operations;

/// One insurance-application record, the fixed input schema of the
/// prediction endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceInput {
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Vintage")]
    pub vintage: i64,
    #[serde(rename = "Annual_Premium")]
    pub annual_premium: f64,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Vehicle_Age")]
    pub vehicle_age: String,
    #[serde(rename = "Vehicle_Damage")]
    pub vehicle_damage: String,
    #[serde(rename = "Driving_License")]
    pub driving_license: i64,
    #[serde(rename = "Region_Code")]
    pub region_code: i64,
    #[serde(rename = "Previously_Insured")]
    pub previously_insured: i64,
    #[serde(rename = "Policy_Sales_Channel")]
    pub policy_sales_channel: i64,
}

impl InsuranceInput {
    /// Wrap the record as a one-row frame in the ingested column layout
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        df!(
            "Gender" => &[self.gender.as_str()],
            "Age" => &[self.age],
            "Driving_License" => &[self.driving_license],
            "Region_Code" => &[self.region_code],
            "Previously_Insured" => &[self.previously_insured],
            "Vehicle_Age" => &[self.vehicle_age.as_str()],
            "Vehicle_Damage" => &[self.vehicle_damage.as_str()],
            "Annual_Premium" => &[self.annual_premium],
            "Policy_Sales_Channel" => &[self.policy_sales_channel],
            "Vintage" => &[self.vintage]
        )
        .map_err(|e| PipelineError::Prediction(e.to_string()))
    }
}

/// Prediction result: integer class plus positive-class probability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: i64,
    pub probability: f64,
}

/// Loaded-once predictor serving the production model
pub struct Predictor {
    model: RandomForestClassifier,
    preprocessor: FeatureTransformer,
}

impl Predictor {
    /// Download model and preprocessor from the production alias.
    /// Called once at process start; there is no reload.
    pub async fn load(registry: &RegistryConfig) -> Result<Self> {
        let s3 = S3Operations::connect(registry.bucket.clone()).await?;

        let model_bytes = s3.download(&registry.production_key(MODEL_OBJECT)).await?;
        let model = RandomForestClassifier::from_json_bytes(&model_bytes)?;

        let preprocessor_bytes = s3
            .download(&registry.production_key(PREPROCESSOR_OBJECT))
            .await?;
        let preprocessor = FeatureTransformer::from_json_bytes(&preprocessor_bytes)?;

        info!(
            model = %registry.model_name,
            trees = model.n_trees(),
            "production model and preprocessor loaded"
        );

        Ok(Self::from_parts(model, preprocessor))
    }

    /// Build a predictor from already-loaded parts
    pub fn from_parts(model: RandomForestClassifier, preprocessor: FeatureTransformer) -> Self {
        Self {
            model,
            preprocessor,
        }
    }

    /// Predict a single application record
    pub fn predict(&self, input: &InsuranceInput) -> Result<Prediction> {
        let df = input.to_dataframe()?;
        let x = self.preprocessor.transform(&df)?;

        let label = self.model.predict(&x)?[0];
        let proba = self.model.predict_proba(&x)?;

        let positive_idx = self
            .model
            .classes()
            .iter()
            .position(|&c| c.round() as i64 == 1);
        let probability = positive_idx.map(|j| proba[[0, j]]).unwrap_or(0.0);

        Ok(Prediction {
            prediction: label.round() as i64,
            probability,
        })
    }
}
