//! Price model abstraction

use std::sync::Arc;

use super::features::FeatureVector;

#[cfg(test)]
use mockall::automock;

/// A loaded regression model that maps features to a price
///
/// Implementations are read-only after construction and safe to call
/// concurrently.
#[cfg_attr(test, automock)]
pub trait PriceModel: Send + Sync {
    /// Predicts the price in MAD
    fn predict(&self, vector: &FeatureVector) -> f64;

    /// Identifies the trained artifact
    fn version(&self) -> String;

    /// Names of the model inputs, in order
    fn feature_names(&self) -> Vec<String>;
}

/// Load state of the model, fixed for the lifetime of the process
#[derive(Clone)]
pub enum ModelStatus {
    Loaded(Arc<dyn PriceModel>),
    Unavailable { reason: String },
}

impl ModelStatus {
    pub fn loaded(model: Arc<dyn PriceModel>) -> Self {
        Self::Loaded(model)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn model(&self) -> Option<&Arc<dyn PriceModel>> {
        match self {
            Self::Loaded(model) => Some(model),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn version(&self) -> Option<String> {
        self.model().map(|m| m.version())
    }

    /// Number of model inputs, zero when nothing is loaded
    pub fn features_loaded(&self) -> usize {
        self.model().map_or(0, |m| m.feature_names().len())
    }
}

impl std::fmt::Debug for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loaded(model) => f
                .debug_tuple("Loaded")
                .field(&model.version())
                .finish(),
            Self::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_status() {
        let status = ModelStatus::unavailable("artifact missing");

        assert!(!status.is_loaded());
        assert!(status.model().is_none());
        assert!(status.version().is_none());
        assert_eq!(status.features_loaded(), 0);
    }

    #[test]
    fn test_loaded_status_exposes_version() {
        let mut model = MockPriceModel::new();
        model.expect_version().return_const("v2.1".to_string());
        model
            .expect_feature_names()
            .returning(|| vec!["vehicle_age".to_string(), "year".to_string()]);

        let status = ModelStatus::loaded(Arc::new(model));
        assert!(status.is_loaded());
        assert_eq!(status.version(), Some("v2.1".to_string()));
        assert_eq!(status.features_loaded(), 2);
        assert_eq!(format!("{:?}", status), "Loaded(\"v2.1\")");
    }
}
