//! Integration tests: transformation stage

mod common;

use crosssell::artifact::IngestionArtifact;
use crosssell::preprocessing::FeatureTransformer;
use crosssell::stages::{split_train_test, DataTransformation, TransformedColumns};
use crosssell::storage::{read_csv, write_csv};

use common::{synthetic_dataset, test_config};

fn prepared_artifact(config: &crosssell::config::PipelineConfig) -> IngestionArtifact {
    let run_id = "test_run".to_string();
    let artifact = IngestionArtifact {
        feature_store_path: config.layout.feature_store_path(&run_id),
        train_path: config.layout.train_path(&run_id),
        test_path: config.layout.test_path(&run_id),
        run_id,
    };

    let df = synthetic_dataset(60);
    let (train, test) = split_train_test(&df, config.test_ratio, config.split_seed).unwrap();
    write_csv(&train, &artifact.train_path).unwrap();
    write_csv(&test, &artifact.test_path).unwrap();

    artifact
}

#[test]
fn test_transformation_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let artifact = prepared_artifact(&config);

    let result = DataTransformation::new(&config).run(&artifact).unwrap();

    let transformer = FeatureTransformer::load(&result.preprocessor_path).unwrap();
    let ordering: TransformedColumns = serde_yaml::from_str(
        &std::fs::read_to_string(&result.output_columns_path).unwrap(),
    )
    .unwrap();
    assert_eq!(ordering.transformed_columns, transformer.output_columns());

    // Transformed frames carry the output columns plus the appended label
    let train_out = read_csv(&result.transformed_train_path).unwrap();
    let test_out = read_csv(&result.transformed_test_path).unwrap();
    assert_eq!(train_out.width(), transformer.output_columns().len() + 1);
    assert_eq!(test_out.width(), train_out.width());

    // The dropped id column is gone from the outputs
    assert!(!ordering.transformed_columns.contains(&"id".to_string()));

    // Test split keeps its natural size and distribution
    let test_in = read_csv(&artifact.test_path).unwrap();
    assert_eq!(test_out.height(), test_in.height());
}

#[test]
fn test_training_split_is_rebalanced() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let artifact = prepared_artifact(&config);

    let result = DataTransformation::new(&config).run(&artifact).unwrap();

    let count_classes = |df: &polars::prelude::DataFrame| -> (usize, usize) {
        let col = df.column("Response").unwrap().i64().unwrap();
        let ones = col.into_iter().flatten().filter(|&v| v == 1).count();
        (df.height() - ones, ones)
    };

    let train_in = read_csv(&artifact.train_path).unwrap();
    let train_out = read_csv(&result.transformed_train_path).unwrap();

    let (neg_in, pos_in) = count_classes(&train_in);
    let (neg_out, pos_out) = count_classes(&train_out);

    // The minority share grows toward balance
    let ratio_in = pos_in as f64 / neg_in as f64;
    let ratio_out = pos_out as f64 / neg_out as f64;
    assert!(
        ratio_out > ratio_in,
        "minority ratio did not improve: {} -> {}",
        ratio_in,
        ratio_out
    );
}

#[test]
fn test_no_test_set_leakage() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let artifact = prepared_artifact(&config);

    let result = DataTransformation::new(&config).run(&artifact).unwrap();

    // Standardization parameters must come from the train split alone:
    // recompute them from the raw train file and check a test-row value.
    let train_in = read_csv(&artifact.train_path).unwrap();
    let ages = train_in.column("Age").unwrap().i64().unwrap();
    let values: Vec<f64> = ages.into_iter().flatten().map(|v| v as f64).collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();

    let test_in = read_csv(&artifact.test_path).unwrap();
    let raw_age = test_in.column("Age").unwrap().i64().unwrap().get(0).unwrap() as f64;

    let test_out = read_csv(&result.transformed_test_path).unwrap();
    let scaled_age = test_out.column("Age").unwrap().f64().unwrap().get(0).unwrap();

    assert!(
        (scaled_age - (raw_age - mean) / std).abs() < 1e-9,
        "test row was not scaled with train statistics"
    );
}
