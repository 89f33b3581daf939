//! Object store access

use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Thin wrapper over one S3 bucket
pub struct S3Operations {
    client: Client,
    bucket: String,
}

impl S3Operations {
    /// Build a client from the default AWS configuration chain
    pub async fn connect(bucket: impl Into<String>) -> Result<Self> {
        let shared = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Ok(Self {
            client: Client::new(&shared),
            bucket: bucket.into(),
        })
    }

    /// Whether an object exists at `key`. Only NotFound maps to `false`;
    /// every other failure propagates.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(PipelineError::Registry(format!(
                        "head_object failed for {}: {}",
                        key, service_err
                    )))
                }
            }
        }
    }

    /// Upload a local file to `key`
    pub async fn upload_file(&self, local_path: &Path, key: &str) -> Result<()> {
        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            PipelineError::Registry(format!("failed to read {}: {}", local_path.display(), e))
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| PipelineError::Registry(format!("upload of {} failed: {}", key, e)))?;

        info!(key, "uploaded object");
        Ok(())
    }

    /// Download an object's bytes
    pub async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| PipelineError::Registry(format!("download of {} failed: {}", key, e)))?;

        let bytes = object
            .body
            .collect()
            .await
            .map_err(|e| PipelineError::Registry(format!("read of {} failed: {}", key, e)))?;

        Ok(bytes.into_bytes().to_vec())
    }

    /// Download and parse a YAML object
    pub async fn read_yaml<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let bytes = self.download(key).await?;
        serde_yaml::from_slice(&bytes)
            .map_err(|e| PipelineError::Registry(format!("failed to parse {}: {}", key, e)))
    }

    /// List object keys under a prefix
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(|e| PipelineError::Registry(format!("listing {} failed: {}", prefix, e)))?;

        Ok(response
            .contents()
            .iter()
            .filter_map(|object| object.key().map(|k| k.to_string()))
            .collect())
    }

    /// Bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}
