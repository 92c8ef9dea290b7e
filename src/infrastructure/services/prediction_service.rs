//! Prediction orchestration: validate, fingerprint, cache, infer

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::prediction::{
    round_price, FeatureBounds, FeatureVector, Fingerprint, ModelStatus, PredictionResult,
};
use crate::domain::DomainError;
use crate::infrastructure::cache::PredictionCache;
use crate::infrastructure::observability::MetricsRegistry;

const CACHE_UNAVAILABLE: &str = "cache_unavailable";

/// Client-facing 503 message; the load failure itself is logged at startup
const MODEL_UNAVAILABLE_MESSAGE: &str = "Model is not loaded; predictions are unavailable";

/// Serves price predictions
///
/// The only writer of prediction metrics. Cache failures never fail a
/// request: a failed lookup counts as a miss and a failed store is logged.
#[derive(Debug, Clone)]
pub struct PredictionService {
    model: ModelStatus,
    cache: PredictionCache,
    metrics: MetricsRegistry,
    bounds: Option<FeatureBounds>,
}

impl PredictionService {
    pub fn new(model: ModelStatus, cache: PredictionCache, metrics: MetricsRegistry) -> Self {
        metrics.set_model_loaded(model.is_loaded());

        Self {
            model,
            cache,
            metrics,
            bounds: None,
        }
    }

    /// Pins the validation bounds instead of deriving them from the clock
    pub fn with_bounds(mut self, bounds: FeatureBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn model_status(&self) -> &ModelStatus {
        &self.model
    }

    pub fn cache(&self) -> &PredictionCache {
        &self.cache
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    fn bounds(&self) -> FeatureBounds {
        self.bounds.unwrap_or_else(FeatureBounds::current)
    }

    /// Handles one prediction request body
    pub async fn predict(&self, body: &Value) -> Result<PredictionResult, DomainError> {
        let started = Instant::now();
        let outcome = self.serve(body).await;

        self.metrics.observe_prediction_duration(started.elapsed());
        match &outcome {
            Ok(_) => self.metrics.prediction_served(),
            Err(e) => self.metrics.error(e.metric_label()),
        }

        outcome
    }

    async fn serve(&self, body: &Value) -> Result<PredictionResult, DomainError> {
        let model = match &self.model {
            ModelStatus::Loaded(model) => model,
            ModelStatus::Unavailable { .. } => {
                return Err(DomainError::model_unavailable(MODEL_UNAVAILABLE_MESSAGE));
            }
        };

        let vector = FeatureVector::validate(body, &self.bounds()).inspect_err(|errors| {
            debug!(errors = %errors, "Rejected prediction request");
        })?;

        let fingerprint = Fingerprint::compute(&vector);
        let version = model.version();

        let cached = match self.cache.get(&fingerprint, &version).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(fingerprint = %fingerprint, error = %e, "Cache lookup failed");
                self.metrics.error(CACHE_UNAVAILABLE);
                None
            }
        };

        let result = match cached {
            Some(entry) => {
                self.metrics.cache_hit();
                PredictionResult::new(&vector, entry.predicted_price, version, true)
            }
            None => {
                self.metrics.cache_miss();

                let price = round_price(model.predict(&vector));
                if !price.is_finite() {
                    return Err(DomainError::internal(
                        "Model produced a non-finite price",
                    ));
                }

                if let Err(e) = self.cache.put(&fingerprint, price, &version).await {
                    warn!(fingerprint = %fingerprint, error = %e, "Cache store failed");
                    self.metrics.error(CACHE_UNAVAILABLE);
                }

                PredictionResult::new(&vector, price, version, false)
            }
        };

        if let Err(e) = self.cache.log_prediction(&result).await {
            debug!(prediction_id = %result.prediction_id, error = %e, "Prediction log write failed");
        }

        info!(
            prediction_id = %result.prediction_id,
            fingerprint = %fingerprint,
            price = result.predicted_price,
            cached = result.cached,
            "Prediction served"
        );

        Ok(result)
    }

    /// Looks up a previously served prediction
    pub async fn find_log(&self, prediction_id: &str) -> Result<PredictionResult, DomainError> {
        if self.cache.backend() == "disabled" {
            return Err(DomainError::cache(
                "Prediction logs require a cache backend",
            ));
        }

        self.cache
            .find_log(prediction_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Prediction '{}' not found", prediction_id)))
    }

    /// Probes the cache and refreshes the `cache_connected` gauge
    pub async fn cache_connected(&self) -> bool {
        let connected = self.cache.is_connected().await;
        self.metrics.set_cache_connected(connected);
        connected
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::prediction::MockPriceModel;
    use crate::infrastructure::cache::{DisabledCache, InMemoryCache};
    use crate::infrastructure::observability::PREDICTIONS_TOTAL;

    fn body() -> Value {
        json!({"year": 2014, "max_power_bhp": 74, "torque_nm": 190, "engine_cc": 1248})
    }

    fn model(times: usize, price: f64) -> MockPriceModel {
        let mut model = MockPriceModel::new();
        model.expect_version().return_const("v1.0".to_string());
        model.expect_predict().times(times).return_const(price);
        model
    }

    fn service(model: MockPriceModel, cache: Arc<dyn crate::domain::cache::Cache>) -> PredictionService {
        PredictionService::new(
            ModelStatus::loaded(Arc::new(model)),
            PredictionCache::new(cache),
            MetricsRegistry::new().unwrap(),
        )
        .with_bounds(FeatureBounds::for_year(2025))
    }

    #[tokio::test]
    async fn test_round_trip_hits_cache() {
        let service = service(model(1, 98_765.4321), Arc::new(InMemoryCache::new()));

        let first = service.predict(&body()).await.unwrap();
        let second = service.predict(&body()).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.predicted_price, 98_765.43);
        assert_eq!(first.predicted_price, second.predicted_price);
        assert_ne!(first.prediction_id, second.prediction_id);
        assert_eq!(first.currency, "MAD");

        let metrics = service.metrics();
        assert_eq!(metrics.sample(PREDICTIONS_TOTAL), Some(2.0));
        assert_eq!(metrics.sample("cache_hits_total"), Some(1.0));
        assert_eq!(metrics.sample("cache_misses_total"), Some(1.0));
        assert_eq!(metrics.sample("prediction_duration_seconds_count"), Some(2.0));
    }

    #[tokio::test]
    async fn test_equivalent_bodies_share_cache_entry() {
        let service = service(model(1, 1000.0), Arc::new(InMemoryCache::new()));

        service.predict(&body()).await.unwrap();
        let reordered = json!({"engine_cc": 1248, "torque_nm": 190.0, "max_power_bhp": 74.0, "year": 2014});

        assert!(service.predict(&reordered).await.unwrap().cached);
    }

    #[tokio::test]
    async fn test_invalid_input_touches_neither_cache_nor_model() {
        // No expectations: any call on either mock panics
        let service = service(MockPriceModel::new(), Arc::new(MockCache::new()));

        let body = json!({"year": 1900, "max_power_bhp": 74, "torque_nm": 190, "engine_cc": -5});
        let result = service.predict(&body).await;

        match result {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.field("year").is_some());
                assert!(errors.field("engine_cc").is_some());
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let metrics = service.metrics();
        assert_eq!(metrics.sample("errors_total{error_type=\"validation\"}"), Some(1.0));
        assert_eq!(metrics.sample(PREDICTIONS_TOTAL), Some(0.0));
        assert_eq!(metrics.sample("prediction_duration_seconds_count"), Some(1.0));
    }

    #[tokio::test]
    async fn test_model_unavailable_rejects_every_request() {
        let service = PredictionService::new(
            ModelStatus::unavailable("Failed to read /srv/models/rf_model.json"),
            PredictionCache::new(Arc::new(MockCache::new())),
            MetricsRegistry::new().unwrap(),
        );

        let valid = service.predict(&body()).await;
        let invalid = service.predict(&json!({"year": "old"})).await;

        match valid {
            Err(DomainError::ModelUnavailable { message }) => {
                assert_eq!(message, MODEL_UNAVAILABLE_MESSAGE);
                assert!(!message.contains("/srv/models"));
            }
            other => panic!("expected model unavailable, got {:?}", other),
        }
        assert!(matches!(invalid, Err(DomainError::ModelUnavailable { .. })));
        assert_eq!(
            service
                .metrics()
                .sample("errors_total{error_type=\"model_unavailable\"}"),
            Some(2.0)
        );
        assert_eq!(service.metrics().sample("model_loaded"), Some(0.0));
    }

    #[tokio::test]
    async fn test_unreachable_cache_still_serves() {
        let mut cache = MockCache::new();
        cache
            .expect_get_raw()
            .returning(|_| Err(DomainError::cache("connection refused")));
        cache
            .expect_set_raw()
            .returning(|_, _, _| Err(DomainError::cache("connection refused")));
        cache.expect_backend().return_const("redis");

        let service = service(model(2, 1500.0), Arc::new(cache));

        let first = service.predict(&body()).await.unwrap();
        let second = service.predict(&body()).await.unwrap();

        assert!(!first.cached);
        assert!(!second.cached);
        assert_eq!(service.metrics().sample(PREDICTIONS_TOTAL), Some(2.0));
        assert_eq!(
            service
                .metrics()
                .sample("errors_total{error_type=\"cache_unavailable\"}"),
            Some(4.0)
        );
    }

    #[tokio::test]
    async fn test_non_finite_price_is_internal_error() {
        let service = service(model(1, f64::NAN), Arc::new(InMemoryCache::new()));

        let result = service.predict(&body()).await;
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_price_overflowing_on_rounding_is_not_cached() {
        let cache = Arc::new(InMemoryCache::new());
        let service = service(model(2, f64::MAX), cache.clone());

        assert!(matches!(
            service.predict(&body()).await,
            Err(DomainError::Internal { .. })
        ));

        // Nothing was stored, so the next request reaches the model again
        assert!(matches!(
            service.predict(&body()).await,
            Err(DomainError::Internal { .. })
        ));
        assert_eq!(service.metrics().sample("cache_hits_total"), Some(0.0));
    }

    #[tokio::test]
    async fn test_prediction_log_lookup() {
        let service = service(model(1, 1000.0), Arc::new(InMemoryCache::new()));

        let result = service.predict(&body()).await.unwrap();
        let logged = service.find_log(&result.prediction_id).await.unwrap();

        assert_eq!(logged, result);
        assert!(matches!(
            service.find_log("missing").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_prediction_log_requires_cache() {
        let service = service(model(1, 1000.0), Arc::new(DisabledCache::new()));

        let result = service.predict(&body()).await.unwrap();
        assert!(!result.cached);

        assert!(matches!(
            service.find_log(&result.prediction_id).await,
            Err(DomainError::Cache { .. })
        ));
        assert!(!service.cache_connected().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_predictions_are_all_counted() {
        let mut model = MockPriceModel::new();
        model.expect_version().return_const("v1.0".to_string());
        model.expect_predict().return_const(1000.0);

        let service = Arc::new(service(model, Arc::new(InMemoryCache::new())));

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    let body = json!({
                        "year": 2000 + (i % 20),
                        "max_power_bhp": 74,
                        "torque_nm": 190,
                        "engine_cc": 1248
                    });
                    service.predict(&body).await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let metrics = service.metrics();
        assert_eq!(metrics.sample(PREDICTIONS_TOTAL), Some(64.0));
        let hits = metrics.sample("cache_hits_total").unwrap();
        let misses = metrics.sample("cache_misses_total").unwrap();
        assert_eq!(hits + misses, 64.0);
    }
}
