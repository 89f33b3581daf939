//! Data ingestion stage

use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info};

use crate::artifact::IngestionArtifact;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::storage::{read_csv, write_csv, MongoStore};

/// Pulls the configured collection into a feature-store CSV, then splits it
/// into train/test files with a fixed ratio and seed.
pub struct DataIngestion<'a> {
    config: &'a PipelineConfig,
}

impl<'a> DataIngestion<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<IngestionArtifact> {
        self.run_inner().await.map_err(|e| {
            error!(error = %e, "data ingestion failed");
            e
        })
    }

    async fn run_inner(&self) -> Result<IngestionArtifact> {
        info!("starting data ingestion");
        let run_id = chrono::Local::now().format("%Y_%m_%d_%H_%M_%S").to_string();

        let feature_store_path = self.export_to_feature_store(&run_id).await?;

        // Split from the durable feature store, not the in-memory frame
        let df = read_csv(&feature_store_path)?;
        let (train_df, test_df) =
            split_train_test(&df, self.config.test_ratio, self.config.split_seed)?;

        let train_path = self.config.layout.train_path(&run_id);
        let test_path = self.config.layout.test_path(&run_id);
        write_csv(&train_df, &train_path)?;
        write_csv(&test_df, &test_path)?;

        info!(
            train_rows = train_df.height(),
            test_rows = test_df.height(),
            train = %train_path.display(),
            test = %test_path.display(),
            "data split into train and test sets"
        );

        Ok(IngestionArtifact {
            run_id,
            feature_store_path,
            train_path,
            test_path,
        })
    }

    async fn export_to_feature_store(&self, run_id: &str) -> Result<std::path::PathBuf> {
        let store = MongoStore::connect(&self.config.mongo).await?;
        let df = store.fetch_all().await?;

        let feature_store_path = self.config.layout.feature_store_path(run_id);
        write_csv(&df, &feature_store_path)?;

        info!(
            rows = df.height(),
            path = %feature_store_path.display(),
            "data exported to feature store"
        );
        Ok(feature_store_path)
    }
}

/// Randomized train/test split with a fixed seed.
/// `n_test = ceil(n * test_ratio)`, clamped so both splits are non-empty.
pub fn split_train_test(
    df: &DataFrame,
    test_ratio: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    let n = df.height();
    if n < 2 {
        return Err(PipelineError::Ingestion(format!(
            "need at least 2 rows to split, got {}",
            n
        )));
    }

    let n_test = ((n as f64 * test_ratio).ceil() as usize).clamp(1, n - 1);

    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

    let train = df
        .take(&train_idx)
        .map_err(|e| PipelineError::Ingestion(e.to_string()))?;
    let test = df
        .take(&test_idx)
        .map_err(|e| PipelineError::Ingestion(e.to_string()))?;

    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: usize) -> DataFrame {
        let ids: Vec<i64> = (0..n as i64).collect();
        df!("id" => &ids).unwrap()
    }

    #[test]
    fn test_split_sizes() {
        let df = frame(10);
        let (train, test) = split_train_test(&df, 0.2, 42).unwrap();
        assert_eq!(test.height(), 2);
        assert_eq!(train.height(), 8);
    }

    #[test]
    fn test_split_is_a_partition() {
        let df = frame(20);
        let (train, test) = split_train_test(&df, 0.25, 42).unwrap();

        let mut seen: Vec<i64> = train
            .column("id")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .chain(test.column("id").unwrap().i64().unwrap().into_iter().flatten())
            .collect();
        seen.sort_unstable();

        assert_eq!(seen, (0..20).collect::<Vec<i64>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        let df = frame(30);
        let (train_a, test_a) = split_train_test(&df, 0.3, 42).unwrap();
        let (train_b, test_b) = split_train_test(&df, 0.3, 42).unwrap();

        assert!(train_a.equals(&train_b));
        assert!(test_a.equals(&test_b));
    }

    #[test]
    fn test_split_rejects_tiny_frames() {
        let df = frame(1);
        assert!(split_train_test(&df, 0.2, 42).is_err());
    }
}
