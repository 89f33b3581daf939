//! Pipeline configuration
//!
//! All environment access happens here, once. The rest of the crate receives
//! an immutable [`PipelineConfig`] by reference; no stage reads the
//! environment directly.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{PipelineError, Result};
use crate::model::Criterion;

/// Registry object name for the serialized model
pub const MODEL_OBJECT: &str = "model.json";
/// Registry object name for the serialized preprocessor
pub const PREPROCESSOR_OBJECT: &str = "preprocessor.json";
/// Registry object name for the metrics record
pub const METRICS_OBJECT: &str = "metrics.yaml";

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| PipelineError::Config(format!("{} is not set", key)))
}

fn env_parse_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| PipelineError::Config(format!("{} has invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

/// Document store connection settings
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl MongoConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            uri: env_required("CONNECTION_STRING")?,
            database: env_or("DATA_INGESTION_DB_NAME", "insurance"),
            collection: env_or("DATA_INGESTION_COLLECTION_NAME", "applications"),
        })
    }
}

/// Object store registry settings and key layout.
///
/// The registry lives under `models/registry/{model_name}/`: immutable
/// `v{n}/` directories plus a `production/` alias overwritten on promotion.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub bucket: String,
    pub model_name: String,
    pub primary_metric: String,
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bucket: env_required("AWS_S3_BUCKET_NAME")?,
            model_name: env_or("MODEL_NAME", "insurance-crosssell"),
            primary_metric: env_or("PRIMARY_METRIC", "F1_Score"),
        })
    }

    /// Prefix shared by all version directories, e.g. `models/registry/{name}/v`
    pub fn version_prefix(&self) -> String {
        format!("models/registry/{}/v", self.model_name)
    }

    /// Key of an object inside an immutable version directory
    pub fn version_key(&self, version: u32, object: &str) -> String {
        format!("models/registry/{}/v{}/{}", self.model_name, version, object)
    }

    /// Key of an object inside the production alias directory
    pub fn production_key(&self, object: &str) -> String {
        format!("models/registry/{}/production/{}", self.model_name, object)
    }
}

/// Hyperparameters of the ensemble classifier, all externally configured
#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_depth: Option<usize>,
    pub criterion: Criterion,
    pub random_state: u64,
}

impl ForestParams {
    pub fn from_env() -> Result<Self> {
        let criterion_raw = env_or("MODEL_TRAINER_CRITERION", "gini");
        let criterion = criterion_raw.parse().map_err(|_| {
            PipelineError::Config(format!(
                "MODEL_TRAINER_CRITERION has invalid value: {}",
                criterion_raw
            ))
        })?;

        let max_depth = match env::var("MODEL_TRAINER_MAX_DEPTH") {
            Ok(raw) => Some(raw.parse().map_err(|_| {
                PipelineError::Config(format!("MODEL_TRAINER_MAX_DEPTH has invalid value: {}", raw))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            n_estimators: env_parse_or("MODEL_TRAINER_N_ESTIMATORS", 200)?,
            min_samples_split: env_parse_or("MODEL_TRAINER_MIN_SAMPLES_SPLIT", 2)?,
            min_samples_leaf: env_parse_or("MODEL_TRAINER_MIN_SAMPLES_LEAF", 1)?,
            max_depth,
            criterion,
            random_state: env_parse_or("MODEL_TRAINER_RANDOM_STATE", 42)?,
        })
    }
}

/// On-disk layout of per-run artifacts.
///
/// Each run writes under `<data_root>/<run_id>/`, one sub-directory per
/// stage. The names mirror the environment variables that override them.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    pub data_root: PathBuf,
    pub ingestion_dir: String,
    pub feature_store_dir: String,
    pub ingested_dir: String,
    pub validation_dir: String,
    pub report_file: String,
    pub transformation_dir: String,
    pub transformed_data_dir: String,
    pub transformed_object_dir: String,
    pub transformed_train_file: String,
    pub transformed_test_file: String,
    pub preprocessor_file: String,
    pub output_columns_file: String,
    pub trainer_dir: String,
    pub model_dir: String,
    pub model_file: String,
    pub metrics_file: String,
}

impl ArtifactLayout {
    pub fn from_env() -> Self {
        Self {
            data_root: PathBuf::from(env_or("DATA_ROOT_DIR", "artifacts")),
            ingestion_dir: env_or("DATA_INGESTION_DIR_NAME", "ingestion"),
            feature_store_dir: env_or("DATA_INGESTION_FEATURE_STORE_DIR", "feature_store"),
            ingested_dir: env_or("DATA_INGESTION_INGESTED_DIR", "ingested"),
            validation_dir: env_or("DATA_VALIDATION_DIR_NAME", "validation"),
            report_file: env_or("DATA_VALIDATION_REPORT_FILE_NAME", "report.yaml"),
            transformation_dir: env_or("DATA_TRANSFORMATION_DIR_NAME", "transformation"),
            transformed_data_dir: env_or("DATA_TRANSFORMATION_TRANSFORMED_DATA_DIR", "transformed"),
            transformed_object_dir: env_or("DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR", "objects"),
            transformed_train_file: env_or("TRANSFORMED_TRAIN_FILE_NAME", "train.csv"),
            transformed_test_file: env_or("TRANSFORMED_TEST_FILE_NAME", "test.csv"),
            preprocessor_file: env_or("PREPROCESSED_OBJECT_FILE_NAME", "preprocessor.json"),
            output_columns_file: env_or(
                "TRANSFORMED_COLUMNS_ORDERING_FILE_NAME",
                "transformed_columns.yaml",
            ),
            trainer_dir: env_or("MODEL_TRAINER_DIR_NAME", "training"),
            model_dir: env_or("MODEL_TRAINER_MODEL_DIR", "model"),
            model_file: env_or("MODEL_TRAINER_MODEL_FILE_NAME", "model.json"),
            metrics_file: env_or("MODEL_TRAINER_MODEL_PERFORMANCE_FILE_NAME", "metrics.yaml"),
        }
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.data_root.join(run_id)
    }

    pub fn feature_store_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id)
            .join(&self.ingestion_dir)
            .join(&self.feature_store_dir)
            .join("data.csv")
    }

    fn ingested_dir_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id)
            .join(&self.ingestion_dir)
            .join(&self.ingested_dir)
    }

    pub fn train_path(&self, run_id: &str) -> PathBuf {
        self.ingested_dir_path(run_id).join("train.csv")
    }

    pub fn test_path(&self, run_id: &str) -> PathBuf {
        self.ingested_dir_path(run_id).join("test.csv")
    }

    pub fn report_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id)
            .join(&self.validation_dir)
            .join(&self.report_file)
    }

    pub fn transformed_train_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id)
            .join(&self.transformation_dir)
            .join(&self.transformed_data_dir)
            .join(&self.transformed_train_file)
    }

    pub fn transformed_test_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id)
            .join(&self.transformation_dir)
            .join(&self.transformed_data_dir)
            .join(&self.transformed_test_file)
    }

    pub fn preprocessor_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id)
            .join(&self.transformation_dir)
            .join(&self.transformed_object_dir)
            .join(&self.preprocessor_file)
    }

    pub fn output_columns_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id)
            .join(&self.transformation_dir)
            .join(&self.output_columns_file)
    }

    pub fn model_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id)
            .join(&self.trainer_dir)
            .join(&self.model_dir)
            .join(&self.model_file)
    }

    pub fn metrics_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id)
            .join(&self.trainer_dir)
            .join(&self.metrics_file)
    }
}

/// Immutable configuration for one pipeline process, constructed once from
/// the environment and passed down by reference.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mongo: MongoConfig,
    pub registry: RegistryConfig,
    pub layout: ArtifactLayout,
    pub forest: ForestParams,
    pub schema_path: PathBuf,
    pub target_column: String,
    pub test_ratio: f64,
    pub split_seed: u64,
    pub sampler_seed: u64,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let test_ratio: f64 = env_parse_or("DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO", 0.2)?;
        if !(0.0..1.0).contains(&test_ratio) || test_ratio == 0.0 {
            return Err(PipelineError::Config(format!(
                "DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO must be in (0, 1), got {}",
                test_ratio
            )));
        }

        Ok(Self {
            mongo: MongoConfig::from_env()?,
            registry: RegistryConfig::from_env()?,
            layout: ArtifactLayout::from_env(),
            forest: ForestParams::from_env()?,
            schema_path: PathBuf::from(env_or("SCHEMA_FILE_PATH", "schema.yaml")),
            target_column: env_or("TARGET_COLUMN", "Response"),
            test_ratio,
            split_seed: env_parse_or("DATA_INGESTION_SPLIT_SEED", 42)?,
            sampler_seed: env_parse_or("DATA_TRANSFORMATION_SAMPLER_SEED", 42)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_keys() {
        let registry = RegistryConfig {
            bucket: "bucket".to_string(),
            model_name: "crosssell".to_string(),
            primary_metric: "F1_Score".to_string(),
        };

        assert_eq!(registry.version_prefix(), "models/registry/crosssell/v");
        assert_eq!(
            registry.version_key(3, MODEL_OBJECT),
            "models/registry/crosssell/v3/model.json"
        );
        assert_eq!(
            registry.production_key(METRICS_OBJECT),
            "models/registry/crosssell/production/metrics.yaml"
        );
    }

    #[test]
    fn test_layout_paths() {
        let layout = ArtifactLayout::from_env();
        let train = layout.train_path("2024_01_01_00_00_00");
        assert!(train.ends_with("ingestion/ingested/train.csv"));
        assert!(train.starts_with(&layout.data_root));

        let report = layout.report_path("2024_01_01_00_00_00");
        assert!(report.ends_with("validation/report.yaml"));
    }
}
