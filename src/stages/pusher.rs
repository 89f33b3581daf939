//! Model pusher stage

use tracing::{error, info};

use crate::artifact::{EvaluationArtifact, PushArtifact, TrainingArtifact, TransformationArtifact};
use crate::config::{PipelineConfig, METRICS_OBJECT, MODEL_OBJECT, PREPROCESSOR_OBJECT};
use crate::error::Result;
use crate::storage::S3Operations;

/// Parse the integer version out of a registry key such as
/// `models/registry/{name}/v3/model.json`, given the shared `.../v` prefix.
fn parse_version(key: &str, version_prefix: &str) -> Option<u32> {
    let rest = key.strip_prefix(version_prefix)?;
    let segment = rest.split('/').next()?;
    segment.parse().ok()
}

/// Next integer version given the existing registry keys: max + 1, or 1
/// when no version directory exists yet.
pub fn next_version(keys: &[String], version_prefix: &str) -> u32 {
    keys.iter()
        .filter_map(|key| parse_version(key, version_prefix))
        .max()
        .map(|v| v + 1)
        .unwrap_or(1)
}

/// Uploads the promoted model, preprocessor, and metrics to a new immutable
/// version directory and to the overwritten production alias.
///
/// The six uploads are not atomic: a crash mid-sequence leaves production in
/// a mixed state with no rollback.
pub struct ModelPusher<'a> {
    config: &'a PipelineConfig,
    s3: &'a S3Operations,
}

impl<'a> ModelPusher<'a> {
    pub fn new(config: &'a PipelineConfig, s3: &'a S3Operations) -> Self {
        Self { config, s3 }
    }

    pub async fn run(
        &self,
        evaluation: &EvaluationArtifact,
        transformation: &TransformationArtifact,
        training: &TrainingArtifact,
    ) -> Result<Option<PushArtifact>> {
        if !evaluation.promote {
            info!("model rejected during evaluation, skipping model push");
            return Ok(None);
        }

        self.run_inner(evaluation, transformation, training)
            .await
            .map(Some)
            .map_err(|e| {
                error!(error = %e, "model push failed");
                e
            })
    }

    async fn run_inner(
        &self,
        evaluation: &EvaluationArtifact,
        transformation: &TransformationArtifact,
        training: &TrainingArtifact,
    ) -> Result<PushArtifact> {
        info!("starting model pusher");
        let registry = &self.config.registry;

        // A listing failure aborts the push: silently assuming v1 could
        // overwrite an existing version.
        let existing = self.s3.list_keys(&registry.version_prefix()).await?;
        let version = next_version(&existing, &registry.version_prefix());

        let uploads = [
            (evaluation.candidate_model_path.as_path(), MODEL_OBJECT),
            (transformation.preprocessor_path.as_path(), PREPROCESSOR_OBJECT),
            (training.metrics_path.as_path(), METRICS_OBJECT),
        ];

        let mut versioned_keys = Vec::with_capacity(uploads.len());
        let mut production_keys = Vec::with_capacity(uploads.len());

        for (local_path, object) in uploads {
            let versioned_key = registry.version_key(version, object);
            self.s3.upload_file(local_path, &versioned_key).await?;
            versioned_keys.push(versioned_key);

            let production_key = registry.production_key(object);
            self.s3.upload_file(local_path, &production_key).await?;
            production_keys.push(production_key);
        }

        info!(version, "model pushed and promoted to production");

        Ok(PushArtifact {
            version,
            versioned_keys,
            production_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "models/registry/crosssell/v";

    fn keys(versions: &[u32]) -> Vec<String> {
        versions
            .iter()
            .flat_map(|v| {
                vec![
                    format!("{}{}/model.json", PREFIX, v),
                    format!("{}{}/preprocessor.json", PREFIX, v),
                    format!("{}{}/metrics.yaml", PREFIX, v),
                ]
            })
            .collect()
    }

    #[test]
    fn test_next_version_after_existing() {
        assert_eq!(next_version(&keys(&[1, 2, 3]), PREFIX), 4);
    }

    #[test]
    fn test_next_version_with_gap() {
        assert_eq!(next_version(&keys(&[1, 5]), PREFIX), 6);
    }

    #[test]
    fn test_first_version_is_one() {
        assert_eq!(next_version(&[], PREFIX), 1);
    }

    #[test]
    fn test_non_version_keys_ignored() {
        let mut all = keys(&[2]);
        all.push("models/registry/crosssell/production/model.json".to_string());
        all.push(format!("{}garbage/model.json", PREFIX));
        assert_eq!(next_version(&all, PREFIX), 3);
    }
}
