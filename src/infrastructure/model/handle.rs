//! Loaded price model

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::domain::prediction::{FeatureVector, PriceModel};
use crate::domain::DomainError;

use super::regressor::Regressor;
use super::schema::{FeatureName, FeatureSchema};

/// On-disk model file
#[derive(Debug, Deserialize)]
struct ModelFile {
    #[serde(default)]
    version: Option<String>,
    regressor: Regressor,
}

/// A validated regressor paired with its feature schema
///
/// Immutable once loaded; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    regressor: Regressor,
    schema: FeatureSchema,
    version: String,
}

impl ModelHandle {
    /// Pairs a regressor with a schema, rejecting combinations that could
    /// fail at prediction time
    pub fn new(
        regressor: Regressor,
        schema: FeatureSchema,
        version: impl Into<String>,
    ) -> Result<Self, DomainError> {
        schema.validate()?;
        regressor.validate(schema.len())?;

        Ok(Self {
            regressor,
            schema,
            version: version.into(),
        })
    }

    /// Parses both documents
    ///
    /// `version` overrides the version recorded in the model file.
    pub fn from_json(
        model_json: &str,
        schema_json: &str,
        version: Option<&str>,
    ) -> Result<Self, DomainError> {
        let model: ModelFile = serde_json::from_str(model_json)
            .map_err(|e| DomainError::artifact(format!("Invalid model file: {}", e)))?;
        let schema: FeatureSchema = serde_json::from_str(schema_json)
            .map_err(|e| DomainError::artifact(format!("Invalid feature schema: {}", e)))?;

        let version = version
            .map(str::to_string)
            .or(model.version)
            .unwrap_or_else(|| "unknown".to_string());

        Self::new(model.regressor, schema, version)
    }

    /// Reads and validates the artifact pair from disk
    pub fn load(
        model_path: impl AsRef<Path>,
        schema_path: impl AsRef<Path>,
        version: Option<&str>,
    ) -> Result<Self, DomainError> {
        let model_path = model_path.as_ref();
        let schema_path = schema_path.as_ref();

        let model_json = read_artifact(model_path)?;
        let schema_json = read_artifact(schema_path)?;

        let handle = Self::from_json(&model_json, &schema_json, version)?;

        info!(
            path = %model_path.display(),
            version = %handle.version,
            regressor = handle.regressor.kind(),
            features = handle.schema.len(),
            "Model loaded"
        );

        Ok(handle)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn regressor(&self) -> &Regressor {
        &self.regressor
    }

    pub fn features(&self) -> &[FeatureName] {
        &self.schema.features
    }
}

fn read_artifact(path: &Path) -> Result<String, DomainError> {
    std::fs::read_to_string(path).map_err(|e| {
        DomainError::artifact(format!("Failed to read '{}': {}", path.display(), e))
    })
}

impl PriceModel for ModelHandle {
    fn predict(&self, vector: &FeatureVector) -> f64 {
        let row = self.schema.row(vector);
        let raw = self.regressor.predict(&row);

        self.schema.target_transform.inverse(raw)
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn feature_names(&self) -> Vec<String> {
        self.schema
            .features
            .iter()
            .map(|f| f.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::FeatureBounds;
    use crate::infrastructure::model::{DecisionTree, TargetTransform};

    const SCHEMA: &str = r#"{
        "features": ["vehicle_age", "max_power_bhp"],
        "reference_year": 2025,
        "target_transform": "log1p"
    }"#;

    // Young cars (age <= 5) are worth more; powerful cars split again
    const MODEL: &str = r#"{
        "version": "rf-test",
        "regressor": {
            "type": "random_forest",
            "trees": [
                {
                    "children_left": [1, -1, 3, -1, -1],
                    "children_right": [2, -1, 4, -1, -1],
                    "feature": [0, -2, 1, -2, -2],
                    "threshold": [5.0, -2.0, 100.0, -2.0, -2.0],
                    "value": [0.0, 12.0, 0.0, 11.0, 11.5]
                }
            ]
        }
    }"#;

    fn vector(year: i32, power: f64) -> FeatureVector {
        FeatureVector::new(year, power, 190.0, 1248, &FeatureBounds::for_year(2025)).unwrap()
    }

    #[test]
    fn test_from_json() {
        let handle = ModelHandle::from_json(MODEL, SCHEMA, None).unwrap();

        assert_eq!(handle.version(), "rf-test");
        assert_eq!(handle.regressor().kind(), "random_forest");
        assert_eq!(handle.feature_names(), vec!["vehicle_age", "max_power_bhp"]);
    }

    #[test]
    fn test_version_override() {
        let handle = ModelHandle::from_json(MODEL, SCHEMA, Some("v9")).unwrap();
        assert_eq!(handle.version(), "v9");
    }

    #[test]
    fn test_predict_applies_inverse_transform() {
        let handle = ModelHandle::from_json(MODEL, SCHEMA, None).unwrap();

        let young = handle.predict(&vector(2022, 74.0));
        assert!((young - 12f64.exp_m1()).abs() < 1e-6);

        let old_weak = handle.predict(&vector(2014, 74.0));
        assert!((old_weak - 11f64.exp_m1()).abs() < 1e-6);

        let old_strong = handle.predict(&vector(2014, 150.0));
        assert!((old_strong - 11.5f64.exp_m1()).abs() < 1e-6);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let handle = ModelHandle::from_json(MODEL, SCHEMA, None).unwrap();
        let v = vector(2014, 74.0);

        assert_eq!(handle.predict(&v), handle.predict(&v));
    }

    #[test]
    fn test_tree_wider_than_schema_is_rejected() {
        let schema = r#"{"features": ["vehicle_age"]}"#;
        let result = ModelHandle::from_json(MODEL, schema, None);

        assert!(matches!(result, Err(DomainError::Artifact { .. })));
    }

    #[test]
    fn test_corrupt_model_is_rejected() {
        let result = ModelHandle::from_json("{not json", SCHEMA, None);
        assert!(matches!(result, Err(DomainError::Artifact { .. })));
    }

    #[test]
    fn test_missing_file_is_artifact_error() {
        let result = ModelHandle::load("does/not/exist.json", "nor/this.json", None);
        assert!(matches!(result, Err(DomainError::Artifact { .. })));
    }

    #[test]
    fn test_new_validates() {
        let schema = FeatureSchema::new(vec![FeatureName::Year])
            .with_target_transform(TargetTransform::Identity);

        let handle = ModelHandle::new(
            Regressor::RandomForest {
                trees: vec![DecisionTree::leaf(42.0)],
            },
            schema,
            "leaf",
        )
        .unwrap();

        assert_eq!(handle.predict(&vector(2014, 74.0)), 42.0);
    }

    #[test]
    fn test_load_bundled_artifacts() {
        let root = env!("CARGO_MANIFEST_DIR");
        let handle = ModelHandle::load(
            format!("{}/models/rf_model.json", root),
            format!("{}/models/feature_info.json", root),
            None,
        )
        .unwrap();

        assert_eq!(handle.features().len(), 5);

        let price = handle.predict(&vector(2014, 74.0));
        assert!(price.is_finite() && price > 0.0);
    }
}
