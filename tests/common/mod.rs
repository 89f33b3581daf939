//! Shared helpers for integration tests

use std::path::Path;

use polars::prelude::*;

use crosssell::config::{
    ArtifactLayout, ForestParams, MongoConfig, PipelineConfig, RegistryConfig,
};
use crosssell::model::Criterion;

/// Schema matching the synthetic dataset below
pub const SCHEMA_YAML: &str = r#"
columns:
  - { name: id, dtype: int }
  - { name: Gender, dtype: category }
  - { name: Age, dtype: int }
  - { name: Driving_License, dtype: int }
  - { name: Region_Code, dtype: int }
  - { name: Previously_Insured, dtype: int }
  - { name: Vehicle_Age, dtype: category }
  - { name: Vehicle_Damage, dtype: category }
  - { name: Annual_Premium, dtype: float }
  - { name: Policy_Sales_Channel, dtype: int }
  - { name: Vintage, dtype: int }
  - { name: Response, dtype: int }

num_columns: [Age, Vintage]
mm_columns: [Annual_Premium]
categorical_columns: [Gender, Vehicle_Age, Vehicle_Damage]
drop_columns: [id]
"#;

/// Pipeline configuration rooted in a scratch directory
pub fn test_config(root: &Path) -> PipelineConfig {
    let schema_path = root.join("schema.yaml");
    std::fs::write(&schema_path, SCHEMA_YAML).unwrap();

    let mut layout = ArtifactLayout::from_env();
    layout.data_root = root.join("artifacts");

    PipelineConfig {
        mongo: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "test".to_string(),
            collection: "test".to_string(),
        },
        registry: RegistryConfig {
            bucket: "test-bucket".to_string(),
            model_name: "crosssell".to_string(),
            primary_metric: "F1_Score".to_string(),
        },
        layout,
        forest: ForestParams {
            n_estimators: 15,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_depth: Some(8),
            criterion: Criterion::Gini,
            random_state: 42,
        },
        schema_path,
        target_column: "Response".to_string(),
        test_ratio: 0.25,
        split_seed: 42,
        sampler_seed: 42,
    }
}

/// Deterministic synthetic insurance dataset. Positive rows (one in three)
/// carry vehicle damage and no prior insurance, so the classes are separable.
pub fn synthetic_dataset(n: usize) -> DataFrame {
    let mut id = Vec::with_capacity(n);
    let mut gender = Vec::with_capacity(n);
    let mut age = Vec::with_capacity(n);
    let mut driving_license = Vec::with_capacity(n);
    let mut region_code = Vec::with_capacity(n);
    let mut previously_insured = Vec::with_capacity(n);
    let mut vehicle_age = Vec::with_capacity(n);
    let mut vehicle_damage = Vec::with_capacity(n);
    let mut annual_premium = Vec::with_capacity(n);
    let mut policy_sales_channel = Vec::with_capacity(n);
    let mut vintage = Vec::with_capacity(n);
    let mut response = Vec::with_capacity(n);

    for i in 0..n {
        let positive = i % 3 == 1;
        id.push(i as i64);
        gender.push(if i % 2 == 0 { "Male" } else { "Female" });
        age.push(20 + (i as i64 * 7) % 40);
        driving_license.push(1i64);
        region_code.push((i as i64 * 3) % 50);
        previously_insured.push(if positive { 0i64 } else { 1 });
        vehicle_age.push(["< 1 Year", "1-2 Year", "> 2 Years"][i % 3]);
        vehicle_damage.push(if positive { "Yes" } else { "No" });
        annual_premium.push(20000.0 + (i as f64 * 137.0) % 30000.0);
        policy_sales_channel.push([26i64, 152, 124][i % 3]);
        vintage.push(50 + (i as i64 * 11) % 250);
        response.push(if positive { 1i64 } else { 0 });
    }

    df!(
        "id" => &id,
        "Gender" => &gender,
        "Age" => &age,
        "Driving_License" => &driving_license,
        "Region_Code" => &region_code,
        "Previously_Insured" => &previously_insured,
        "Vehicle_Age" => &vehicle_age,
        "Vehicle_Damage" => &vehicle_damage,
        "Annual_Premium" => &annual_premium,
        "Policy_Sales_Channel" => &policy_sales_channel,
        "Vintage" => &vintage,
        "Response" => &response
    )
    .unwrap()
}
