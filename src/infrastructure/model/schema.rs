//! Feature schema: input order, scaling and target transform

use serde::{Deserialize, Serialize};

use crate::domain::prediction::FeatureVector;
use crate::domain::DomainError;

/// Year the training pipeline used to derive `vehicle_age`
pub const DEFAULT_REFERENCE_YEAR: i32 = 2025;

/// A model input the schema can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    /// `reference_year - year`
    VehicleAge,
    Year,
    MaxPowerBhp,
    TorqueNm,
    EngineCc,
}

impl FeatureName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::VehicleAge => "vehicle_age",
            FeatureName::Year => "year",
            FeatureName::MaxPowerBhp => "max_power_bhp",
            FeatureName::TorqueNm => "torque_nm",
            FeatureName::EngineCc => "engine_cc",
        }
    }

    fn extract(&self, vector: &FeatureVector, reference_year: i32) -> f64 {
        match self {
            FeatureName::VehicleAge => f64::from(reference_year - vector.year()),
            FeatureName::Year => f64::from(vector.year()),
            FeatureName::MaxPowerBhp => vector.max_power_bhp(),
            FeatureName::TorqueNm => vector.torque_nm(),
            FeatureName::EngineCc => f64::from(vector.engine_cc()),
        }
    }
}

impl std::fmt::Display for FeatureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fitted standard scaler: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&self, n_features: usize) -> Result<(), DomainError> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(DomainError::artifact(format!(
                "Scaler has {} means and {} scales for {} features",
                self.mean.len(),
                self.scale.len(),
                n_features
            )));
        }

        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(DomainError::artifact("Scaler mean must be finite"));
        }

        if self.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(DomainError::artifact(
                "Scaler scale must be finite and non-zero",
            ));
        }

        Ok(())
    }

    fn apply(&self, row: &mut [f64]) {
        for ((x, mean), scale) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
            *x = (*x - mean) / scale;
        }
    }
}

/// Transform the regressor was trained against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTransform {
    #[default]
    Identity,
    Log,
    Log1p,
}

impl TargetTransform {
    /// Maps a regressor output back to a price
    pub fn inverse(&self, value: f64) -> f64 {
        match self {
            TargetTransform::Identity => value,
            TargetTransform::Log => value.exp(),
            TargetTransform::Log1p => value.exp_m1(),
        }
    }
}

fn default_reference_year() -> i32 {
    DEFAULT_REFERENCE_YEAR
}

/// Companion schema shipped next to the model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub features: Vec<FeatureName>,
    #[serde(default = "default_reference_year")]
    pub reference_year: i32,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    #[serde(default)]
    pub target_transform: TargetTransform,
}

impl FeatureSchema {
    pub fn new(features: Vec<FeatureName>) -> Self {
        Self {
            features,
            reference_year: DEFAULT_REFERENCE_YEAR,
            scaler: None,
            target_transform: TargetTransform::Identity,
        }
    }

    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn with_target_transform(mut self, transform: TargetTransform) -> Self {
        self.target_transform = transform;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.features.is_empty() {
            return Err(DomainError::artifact("Feature schema lists no features"));
        }

        if let Some(scaler) = &self.scaler {
            scaler.validate(self.features.len())?;
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Builds the (scaled) model input row for a validated vector
    pub fn row(&self, vector: &FeatureVector) -> Vec<f64> {
        let mut row: Vec<f64> = self
            .features
            .iter()
            .map(|feature| feature.extract(vector, self.reference_year))
            .collect();

        if let Some(scaler) = &self.scaler {
            scaler.apply(&mut row);
        }

        row
    }
}
