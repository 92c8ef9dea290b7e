//! Domain layer - Core prediction logic and entities

pub mod cache;
pub mod error;
pub mod prediction;

pub use cache::{Cache, CacheEntry, CacheExt, CacheKeyGenerator, CacheKeyParams, DigestKeyGenerator};
pub use error::DomainError;
pub use prediction::{
    FeatureBounds, FeatureVector, Fingerprint, InputFeatures, ModelStatus, PredictionResult,
    PriceModel, ValidationError, ValidationErrors,
};
