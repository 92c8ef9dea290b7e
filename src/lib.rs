//! Car Price Prediction API
//!
//! Serves used-car resale price estimates (in MAD) from a pretrained
//! regression artifact, with:
//! - Strict request validation
//! - Repeated-query caching (in-memory, Redis, or disabled)
//! - Prometheus metrics and structured tracing

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::ModelConfig;
use domain::ModelStatus;
use infrastructure::{
    cache::{CacheFactory, PredictionCache, PredictionCacheConfig},
    model::ModelHandle,
    observability::MetricsRegistry,
    services::PredictionService,
};
use tracing::{info, warn};

/// Create the application state with all services initialized
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
///
/// Fails when the model is required but cannot be loaded. An unreachable
/// cache never fails startup.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let metrics = MetricsRegistry::from_config(&config.observability.metrics)?;
    let model = load_model(&config.model)?;

    let cache = CacheFactory::new().create_or_disabled(&config.cache).await;
    let cache = PredictionCache::with_config(
        cache,
        PredictionCacheConfig::default().with_ttl(config.cache.ttl()),
    );

    let service = PredictionService::new(model, cache, metrics.clone());
    service.cache_connected().await;

    let metrics_path = metrics
        .is_enabled()
        .then(|| config.observability.metrics.path.clone());

    Ok(AppState::new(service, metrics_path))
}

/// Loads the model artifact according to `model.required`
pub fn load_model(config: &ModelConfig) -> anyhow::Result<ModelStatus> {
    match ModelHandle::load(&config.path, &config.schema_path, config.version.as_deref()) {
        Ok(handle) => Ok(ModelStatus::loaded(Arc::new(handle))),
        Err(e) if !config.required => {
            warn!(
                error = %e,
                "Model unavailable, serving without predictions"
            );
            Ok(ModelStatus::unavailable(e.to_string()))
        }
        Err(e) => {
            info!("Set model.required = false to start without a model");
            Err(anyhow::anyhow!("Failed to load model: {}", e))
        }
    }
}
