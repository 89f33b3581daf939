//! Integration tests: validation gate

mod common;

use crosssell::artifact::IngestionArtifact;
use crosssell::stages::{DataValidation, ValidationReport};
use crosssell::storage::write_csv;
use polars::prelude::NamedFrom;

use common::{synthetic_dataset, test_config};

fn ingestion_artifact(config: &crosssell::config::PipelineConfig) -> IngestionArtifact {
    let run_id = "test_run".to_string();
    IngestionArtifact {
        feature_store_path: config.layout.feature_store_path(&run_id),
        train_path: config.layout.train_path(&run_id),
        test_path: config.layout.test_path(&run_id),
        run_id,
    }
}

#[test]
fn test_validation_passes_on_exact_schema() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let artifact = ingestion_artifact(&config);

    let df = synthetic_dataset(30);
    write_csv(&df, &artifact.train_path).unwrap();
    write_csv(&df, &artifact.test_path).unwrap();

    let result = DataValidation::new(&config).run(&artifact).unwrap();
    assert!(result.status);
    assert!(result.message.is_empty());

    let report: ValidationReport =
        serde_yaml::from_str(&std::fs::read_to_string(&result.report_path).unwrap()).unwrap();
    assert!(report.validation_status);
}

#[test]
fn test_validation_fails_on_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let artifact = ingestion_artifact(&config);

    let df = synthetic_dataset(30);
    write_csv(&df, &artifact.train_path).unwrap();
    write_csv(&df.drop("Vintage").unwrap(), &artifact.test_path).unwrap();

    let result = DataValidation::new(&config).run(&artifact).unwrap();
    assert!(!result.status);
    assert!(result.message.contains("test"));
    assert!(result.message.contains("Vintage"));
}

#[test]
fn test_validation_fails_on_extra_column() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let artifact = ingestion_artifact(&config);

    let mut df = synthetic_dataset(30);
    let extra: Vec<i64> = (0..30).collect();
    df.with_column(polars::prelude::Series::new("Bonus".into(), extra))
        .unwrap();

    write_csv(&df, &artifact.train_path).unwrap();
    write_csv(&df, &artifact.test_path).unwrap();

    let result = DataValidation::new(&config).run(&artifact).unwrap();
    assert!(!result.status);
    assert!(result.message.contains("Bonus"));
}

#[test]
fn test_report_written_even_when_load_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let artifact = ingestion_artifact(&config);
    // train/test files intentionally not written

    let result = DataValidation::new(&config).run(&artifact);
    assert!(result.is_err());

    let report_path = config.layout.report_path(&artifact.run_id);
    let report: ValidationReport =
        serde_yaml::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert!(!report.validation_status);
    assert!(!report.message.is_empty());
}
