//! Document store access

use std::path::Path;

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection};
use polars::prelude::*;
use tracing::info;

use super::read_csv;
use crate::config::MongoConfig;
use crate::error::{PipelineError, Result};

/// Handle to the configured document collection
pub struct MongoStore {
    client: Client,
    database: String,
    collection: String,
}

impl MongoStore {
    /// Connect and verify the connection with a ping
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri).await.map_err(|e| {
            PipelineError::Ingestion(format!("failed to connect to MongoDB: {}", e))
        })?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| PipelineError::Ingestion(format!("MongoDB ping failed: {}", e)))?;

        info!(database = %config.database, collection = %config.collection, "connected to MongoDB");

        Ok(Self {
            client,
            database: config.database.clone(),
            collection: config.collection.clone(),
        })
    }

    fn collection(&self) -> Collection<Document> {
        self.client
            .database(&self.database)
            .collection(&self.collection)
    }

    /// Read the whole collection into a flat table, identity field excluded
    pub async fn fetch_all(&self) -> Result<DataFrame> {
        let cursor = self
            .collection()
            .find(doc! {})
            .projection(doc! { "_id": 0 })
            .await
            .map_err(|e| PipelineError::Ingestion(format!("collection query failed: {}", e)))?;

        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| PipelineError::Ingestion(format!("cursor read failed: {}", e)))?;

        info!(rows = documents.len(), "fetched collection");
        documents_to_dataframe(&documents)
    }

    /// Bulk-insert a CSV file into the collection, returning the row count
    pub async fn insert_csv(&self, path: impl AsRef<Path>) -> Result<usize> {
        let df = read_csv(path)?;
        let documents = dataframe_to_documents(&df)?;

        let result = self
            .collection()
            .insert_many(&documents)
            .await
            .map_err(|e| PipelineError::Ingestion(format!("bulk insert failed: {}", e)))?;

        let inserted = result.inserted_ids.len();
        info!(inserted, "inserted records into collection");
        Ok(inserted)
    }
}

/// Build a DataFrame from documents. Column order follows the first
/// document; each column's type is decided by its first non-null value.
pub fn documents_to_dataframe(documents: &[Document]) -> Result<DataFrame> {
    let first = documents
        .first()
        .ok_or_else(|| PipelineError::Ingestion("collection is empty".to_string()))?;

    let keys: Vec<String> = first.keys().map(|k| k.to_string()).collect();
    let mut columns: Vec<Column> = Vec::with_capacity(keys.len());

    for key in &keys {
        let sample = documents.iter().find_map(|d| match d.get(key.as_str()) {
            None | Some(Bson::Null) => None,
            other => other,
        });

        let series = match sample {
            Some(Bson::Double(_)) => {
                let values: Vec<Option<f64>> =
                    documents.iter().map(|d| bson_f64(d.get(key.as_str()))).collect();
                Series::new(key.as_str().into(), values)
            }
            Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Boolean(_)) => {
                let values: Vec<Option<i64>> =
                    documents.iter().map(|d| bson_i64(d.get(key.as_str()))).collect();
                Series::new(key.as_str().into(), values)
            }
            _ => {
                let values: Vec<Option<String>> =
                    documents.iter().map(|d| bson_string(d.get(key.as_str()))).collect();
                Series::new(key.as_str().into(), values)
            }
        };

        columns.push(series.into());
    }

    DataFrame::new(columns).map_err(|e| PipelineError::Ingestion(e.to_string()))
}

/// Convert a DataFrame into one document per row
pub fn dataframe_to_documents(df: &DataFrame) -> Result<Vec<Document>> {
    enum ColVals {
        F64(Vec<Option<f64>>),
        I64(Vec<Option<i64>>),
        Str(Vec<Option<String>>),
    }

    let mut typed: Vec<(String, ColVals)> = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let name = col.name().to_string();
        let series = col.as_materialized_series();

        let values = match col.dtype() {
            DataType::Float64 | DataType::Float32 => {
                let ca = series
                    .cast(&DataType::Float64)
                    .map_err(|e| PipelineError::Data(e.to_string()))?;
                ColVals::F64(ca.f64().map_err(|e| PipelineError::Data(e.to_string()))?.into_iter().collect())
            }
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Boolean => {
                let ca = series
                    .cast(&DataType::Int64)
                    .map_err(|e| PipelineError::Data(e.to_string()))?;
                ColVals::I64(ca.i64().map_err(|e| PipelineError::Data(e.to_string()))?.into_iter().collect())
            }
            DataType::String => ColVals::Str(
                series
                    .str()
                    .map_err(|e| PipelineError::Data(e.to_string()))?
                    .into_iter()
                    .map(|v| v.map(|s| s.to_string()))
                    .collect(),
            ),
            other => {
                return Err(PipelineError::Data(format!(
                    "unsupported dtype {:?} in column {}",
                    other, name
                )))
            }
        };

        typed.push((name, values));
    }

    let mut documents = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let mut document = Document::new();
        for (name, values) in &typed {
            let value = match values {
                ColVals::F64(v) => v[row].map(Bson::Double).unwrap_or(Bson::Null),
                ColVals::I64(v) => v[row].map(Bson::Int64).unwrap_or(Bson::Null),
                ColVals::Str(v) => v[row]
                    .as_ref()
                    .map(|s| Bson::String(s.clone()))
                    .unwrap_or(Bson::Null),
            };
            document.insert(name.clone(), value);
        }
        documents.push(document);
    }

    Ok(documents)
}

fn bson_f64(value: Option<&Bson>) -> Option<f64> {
    match value {
        Some(Bson::Double(v)) => Some(*v),
        Some(Bson::Int32(v)) => Some(*v as f64),
        Some(Bson::Int64(v)) => Some(*v as f64),
        _ => None,
    }
}

fn bson_i64(value: Option<&Bson>) -> Option<i64> {
    match value {
        Some(Bson::Int32(v)) => Some(*v as i64),
        Some(Bson::Int64(v)) => Some(*v),
        Some(Bson::Boolean(v)) => Some(*v as i64),
        Some(Bson::Double(v)) => Some(*v as i64),
        _ => None,
    }
}

fn bson_string(value: Option<&Bson>) -> Option<String> {
    match value {
        Some(Bson::String(v)) => Some(v.clone()),
        Some(Bson::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_to_dataframe() {
        let documents = vec![
            doc! { "Age": 25i64, "Premium": 100.5, "Gender": "Male" },
            doc! { "Age": 30i64, "Premium": 200.0, "Gender": "Female" },
        ];

        let df = documents_to_dataframe(&documents).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert_eq!(
            df.column("Age").unwrap().i64().unwrap().get(1),
            Some(30)
        );
        assert_eq!(
            df.column("Gender").unwrap().str().unwrap().get(0),
            Some("Male")
        );
    }

    #[test]
    fn test_empty_collection_errors() {
        assert!(documents_to_dataframe(&[]).is_err());
    }

    #[test]
    fn test_dataframe_round_trip() {
        let df = df!(
            "Age" => &[25i64, 30],
            "Premium" => &[100.5, 200.0],
            "Gender" => &["Male", "Female"]
        )
        .unwrap();

        let documents = dataframe_to_documents(&df).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].get_i64("Age").unwrap(), 25);
        assert_eq!(documents[1].get_str("Gender").unwrap(), "Female");

        let restored = documents_to_dataframe(&documents).unwrap();
        assert_eq!(restored.height(), df.height());
        assert_eq!(restored.width(), df.width());
    }
}
