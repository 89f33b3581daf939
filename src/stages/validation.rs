//! Data validation stage

use std::collections::HashSet;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::artifact::{IngestionArtifact, ValidationArtifact};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::schema::DataSchema;
use crate::storage::read_csv;

/// Report written for every validation outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub validation_status: bool,
    pub message: String,
}

/// Checks both split files against the declared schema: column count and
/// exact column-name set. The report is written regardless of outcome.
pub struct DataValidation<'a> {
    config: &'a PipelineConfig,
}

impl<'a> DataValidation<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Run validation. Check failures produce an artifact with
    /// `status: false`; only hard failures (unreadable files, unwritable
    /// report) re-raise — and the report is still written first when
    /// possible.
    pub fn run(&self, ingestion: &IngestionArtifact) -> Result<ValidationArtifact> {
        info!("starting data validation");
        let report_path = self.config.layout.report_path(&ingestion.run_id);

        let outcome = self.validate(ingestion);
        let (status, message) = match &outcome {
            Ok((status, message)) => (*status, message.clone()),
            Err(e) => {
                error!(error = %e, "data validation failed");
                (false, e.to_string())
            }
        };

        // Report is written on every path, including the error one
        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let report = ValidationReport {
            validation_status: status,
            message: message.clone(),
        };
        std::fs::write(&report_path, serde_yaml::to_string(&report)?)?;
        info!(path = %report_path.display(), "validation report written");

        outcome?;

        if status {
            info!("data validation completed successfully");
        } else {
            warn!(message = %message, "data validation failed");
        }

        Ok(ValidationArtifact {
            status,
            message,
            report_path,
        })
    }

    fn validate(&self, ingestion: &IngestionArtifact) -> Result<(bool, String)> {
        let schema = DataSchema::from_yaml_file(&self.config.schema_path)?;
        let train_df = read_csv(&ingestion.train_path)?;
        let test_df = read_csv(&ingestion.test_path)?;

        let mut failures: Vec<String> = Vec::new();
        for (split, df) in [("train", &train_df), ("test", &test_df)] {
            if !check_column_count(df, schema.column_count()) {
                warn!(
                    split,
                    expected = schema.column_count(),
                    actual = df.width(),
                    "column count validation failed"
                );
                failures.push(format!(
                    "{} column count mismatch: expected {}, got {}.",
                    split,
                    schema.column_count(),
                    df.width()
                ));
            }

            let (missing, extra) = check_allowed_columns(df, &schema.allowed_columns());
            if !missing.is_empty() || !extra.is_empty() {
                error!(split, columns = ?missing, "missing columns");
                error!(split, columns = ?extra, "extra columns");
                failures.push(format!(
                    "{} contains disallowed columns (missing: {:?}, extra: {:?}).",
                    split, missing, extra
                ));
            }
        }

        Ok((failures.is_empty(), failures.join(" ")))
    }
}

/// Whether the frame has the expected number of columns
pub fn check_column_count(df: &DataFrame, expected: usize) -> bool {
    df.width() == expected
}

/// Missing and extra column names relative to the allowed set
pub fn check_allowed_columns(
    df: &DataFrame,
    allowed: &HashSet<&str>,
) -> (Vec<String>, Vec<String>) {
    let actual: HashSet<&str> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.as_str())
        .collect();

    let mut missing: Vec<String> = allowed
        .difference(&actual)
        .map(|s| s.to_string())
        .collect();
    let mut extra: Vec<String> = actual
        .difference(allowed)
        .map(|s| s.to_string())
        .collect();
    missing.sort();
    extra.sort();

    (missing, extra)
}
