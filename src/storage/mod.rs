//! External storage: document store, object store, and CSV files

mod mongo;
mod s3;

pub use mongo::MongoStore;
pub use s3::S3Operations;

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Load a CSV file with header and inferred schema
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| PipelineError::Data(format!("failed to open {}: {}", path.display(), e)))?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| PipelineError::Data(format!("failed to read {}: {}", path.display(), e)))
}

/// Write a DataFrame as CSV, creating parent directories
pub fn write_csv(df: &DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)
        .map_err(|e| PipelineError::Data(format!("failed to create {}: {}", path.display(), e)))?;

    CsvWriter::new(&mut file)
        .finish(&mut df.clone())
        .map_err(|e| PipelineError::Data(format!("failed to write {}: {}", path.display(), e)))
}
