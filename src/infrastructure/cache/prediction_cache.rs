//! Prediction cache and prediction log on top of a generic [`Cache`]

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::cache::{Cache, CacheEntry, CacheExt};
use crate::domain::prediction::{Fingerprint, PredictionResult};
use crate::domain::DomainError;

/// Configuration for prediction caching
#[derive(Debug, Clone)]
pub struct PredictionCacheConfig {
    /// Namespace prefix for cached prices
    pub namespace: String,
    /// Namespace prefix for logged predictions
    pub log_namespace: String,
    /// Lifetime of a cached price
    pub ttl: Duration,
    /// Logged predictions live this many times longer than cached prices
    pub log_ttl_factor: u32,
}

impl Default for PredictionCacheConfig {
    fn default() -> Self {
        Self {
            namespace: "prediction".to_string(),
            log_namespace: "log".to_string(),
            ttl: Duration::from_secs(3600),
            log_ttl_factor: 24,
        }
    }
}

impl PredictionCacheConfig {
    /// Sets the cached price TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn log_ttl(&self) -> Duration {
        self.ttl.saturating_mul(self.log_ttl_factor)
    }
}

/// Typed access to cached prices and the prediction log
#[derive(Debug, Clone)]
pub struct PredictionCache {
    cache: Arc<dyn Cache>,
    config: PredictionCacheConfig,
}

impl PredictionCache {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self::with_config(cache, PredictionCacheConfig::default())
    }

    pub fn with_config(cache: Arc<dyn Cache>, config: PredictionCacheConfig) -> Self {
        Self { cache, config }
    }

    pub fn config(&self) -> &PredictionCacheConfig {
        &self.config
    }

    /// Name of the underlying backend
    pub fn backend(&self) -> &'static str {
        self.cache.backend()
    }

    /// Whether the underlying store currently answers
    pub async fn is_connected(&self) -> bool {
        self.cache.ping().await.is_ok()
    }

    fn entry_key(&self, fingerprint: &Fingerprint) -> String {
        format!("{}:{}", self.config.namespace, fingerprint)
    }

    fn log_key(&self, prediction_id: &str) -> String {
        format!("{}:{}", self.config.log_namespace, prediction_id)
    }

    /// Looks up a live entry produced by `model_version`
    ///
    /// Expired entries and entries written by another model version are
    /// reported as absent.
    pub async fn get(
        &self,
        fingerprint: &Fingerprint,
        model_version: &str,
    ) -> Result<Option<CacheEntry>, DomainError> {
        let key = self.entry_key(fingerprint);
        let entry: Option<CacheEntry> = self.cache.get(&key).await?;

        Ok(entry.filter(|entry| {
            if entry.is_expired() {
                debug!(fingerprint = %fingerprint, "Ignoring expired cache entry");
                return false;
            }
            if entry.model_version != model_version {
                debug!(
                    fingerprint = %fingerprint,
                    cached_version = %entry.model_version,
                    "Ignoring cache entry from another model version"
                );
                return false;
            }
            true
        }))
    }

    /// Stores a price for the fingerprint, replacing any previous entry
    pub async fn put(
        &self,
        fingerprint: &Fingerprint,
        predicted_price: f64,
        model_version: &str,
    ) -> Result<CacheEntry, DomainError> {
        let entry = CacheEntry::new(
            fingerprint.as_str(),
            predicted_price,
            model_version,
            self.config.ttl,
        );

        self.cache
            .set(&self.entry_key(fingerprint), &entry, self.config.ttl)
            .await?;

        Ok(entry)
    }

    /// Records a served prediction under its id
    pub async fn log_prediction(&self, result: &PredictionResult) -> Result<(), DomainError> {
        self.cache
            .set(
                &self.log_key(&result.prediction_id),
                result,
                self.config.log_ttl(),
            )
            .await
    }

    /// Reads back a logged prediction
    pub async fn find_log(&self, prediction_id: &str) -> Result<Option<PredictionResult>, DomainError> {
        self.cache.get(&self.log_key(prediction_id)).await
    }
}
