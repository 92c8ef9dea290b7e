//! Prediction response model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::features::FeatureVector;

/// Currency of every predicted price
pub const CURRENCY: &str = "MAD";

/// Echo of the validated request features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFeatures {
    pub year: i32,
    pub max_power_bhp: f64,
    pub torque_nm: f64,
    pub engine_cc: u32,
}

impl From<&FeatureVector> for InputFeatures {
    fn from(vector: &FeatureVector) -> Self {
        Self {
            year: vector.year(),
            max_power_bhp: vector.max_power_bhp(),
            torque_nm: vector.torque_nm(),
            engine_cc: vector.engine_cc(),
        }
    }
}

/// Result returned for one prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
    pub currency: String,
    pub input_features: InputFeatures,
    pub model_version: String,
    pub cached: bool,
    pub prediction_id: String,
    pub timestamp: DateTime<Utc>,
}

impl PredictionResult {
    /// Builds a result with a fresh prediction id and the current time
    pub fn new(
        vector: &FeatureVector,
        predicted_price: f64,
        model_version: impl Into<String>,
        cached: bool,
    ) -> Self {
        Self {
            predicted_price,
            currency: CURRENCY.to_string(),
            input_features: InputFeatures::from(vector),
            model_version: model_version.into(),
            cached,
            prediction_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Rounds a price to cents
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::FeatureBounds;

    fn vector() -> FeatureVector {
        FeatureVector::new(2014, 74.0, 190.0, 1248, &FeatureBounds::for_year(2025)).unwrap()
    }

    #[test]
    fn test_new_result_has_unique_id() {
        let a = PredictionResult::new(&vector(), 1000.0, "v1.0", false);
        let b = PredictionResult::new(&vector(), 1000.0, "v1.0", true);

        assert_ne!(a.prediction_id, b.prediction_id);
        assert_eq!(a.currency, "MAD");
        assert_eq!(a.input_features.year, 2014);
        assert!(!a.cached);
        assert!(b.cached);
    }

    #[test]
    fn test_result_serialization() {
        let result = PredictionResult::new(&vector(), 98_765.43, "v1.0", false);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["predicted_price"], 98_765.43);
        assert_eq!(json["currency"], "MAD");
        assert_eq!(json["model_version"], "v1.0");
        assert_eq!(json["cached"], false);
        assert_eq!(json["input_features"]["engine_cc"], 1248);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_round_price() {
        assert_eq!(round_price(12_345.678), 12_345.68);
        assert_eq!(round_price(0.004), 0.0);
        assert_eq!(round_price(100.0), 100.0);
    }
}
