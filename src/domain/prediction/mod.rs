//! Prediction domain - features, fingerprints, results and the model seam

mod features;
mod fingerprint;
mod model;
mod result;

pub use features::{
    FeatureBounds, FeatureVector, ValidationError, ValidationErrors, FIELD_ENGINE_CC,
    FIELD_MAX_POWER_BHP, FIELD_TORQUE_NM, FIELD_YEAR, MAX_ENGINE_CC, MAX_POWER_BHP,
    MAX_TORQUE_NM, MIN_YEAR,
};
pub use fingerprint::Fingerprint;
pub use model::{ModelStatus, PriceModel};
pub use result::{round_price, InputFeatures, PredictionResult, CURRENCY};

#[cfg(test)]
pub use model::MockPriceModel;
