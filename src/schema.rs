//! Declared dataset schema
//!
//! The schema file declares the full allowed column set of the ingested
//! splits and assigns feature columns to the transformer families. Validation
//! checks splits against `columns`; transformation consumes the families.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// One declared column: name plus a documentation-level dtype tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub dtype: String,
}

/// Declared schema loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSchema {
    /// Full allowed column set, target included, in declared order
    pub columns: Vec<ColumnSpec>,
    /// Columns standardized (z-score)
    pub num_columns: Vec<String>,
    /// Columns min-max scaled
    pub mm_columns: Vec<String>,
    /// Columns one-hot encoded
    pub categorical_columns: Vec<String>,
    /// Columns dropped before modelling
    pub drop_columns: Vec<String>,
}

impl DataSchema {
    /// Load and validate a schema from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Schema(format!("failed to read {}: {}", path.display(), e))
        })?;
        let schema: Self = serde_yaml::from_str(&raw)
            .map_err(|e| PipelineError::Schema(format!("failed to parse {}: {}", path.display(), e)))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Number of declared columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The allowed column-name set
    pub fn allowed_columns(&self) -> HashSet<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Every family member must be a declared column
    pub fn validate(&self) -> Result<()> {
        let allowed = self.allowed_columns();
        let families = [
            ("num_columns", &self.num_columns),
            ("mm_columns", &self.mm_columns),
            ("categorical_columns", &self.categorical_columns),
            ("drop_columns", &self.drop_columns),
        ];

        for (family, members) in families {
            for name in members {
                if !allowed.contains(name.as_str()) {
                    return Err(PipelineError::Schema(format!(
                        "{} entry '{}' is not a declared column",
                        family, name
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> DataSchema {
        serde_yaml::from_str(
            r#"
columns:
  - { name: id, dtype: int }
  - { name: Age, dtype: int }
  - { name: Gender, dtype: category }
  - { name: Response, dtype: int }
num_columns: [Age]
mm_columns: []
categorical_columns: [Gender]
drop_columns: [id]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_column_count_and_allowed_set() {
        let schema = sample_schema();
        assert_eq!(schema.column_count(), 4);

        let allowed = schema.allowed_columns();
        assert!(allowed.contains("Age"));
        assert!(allowed.contains("Response"));
        assert!(!allowed.contains("Vintage"));
    }

    #[test]
    fn test_validate_rejects_unknown_family_member() {
        let mut schema = sample_schema();
        schema.num_columns.push("Vintage".to_string());
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_shipped_schema_parses() {
        let schema = DataSchema::from_yaml_file(concat!(env!("CARGO_MANIFEST_DIR"), "/schema.yaml"))
            .unwrap();
        assert_eq!(schema.column_count(), 12);
        assert!(schema.allowed_columns().contains("Response"));
    }
}
