//! Health and service banner endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::state::AppState;

/// Health response describing the model and the cache
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub model_loaded: bool,
    pub model_version: Option<String>,
    pub features_loaded: usize,
    pub cache: CacheHealth,
}

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub backend: String,
    pub connected: bool,
}

/// Health check status
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn evaluate(model_loaded: bool, cache_connected: bool) -> Self {
        match (model_loaded, cache_connected) {
            (false, _) => Self::Unhealthy,
            (true, false) => Self::Degraded,
            (true, true) => Self::Healthy,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Healthy | Self::Degraded => StatusCode::OK,
            Self::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Reports whether predictions can be served
///
/// A missing cache only degrades the service; a missing model makes it
/// unhealthy.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let service = &state.prediction_service;
    let model = service.model_status();
    let connected = service.cache_connected().await;

    let status = HealthStatus::evaluate(model.is_loaded(), connected);
    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: model.is_loaded(),
        model_version: model.version(),
        features_loaded: model.features_loaded(),
        cache: CacheHealth {
            backend: service.cache().backend().to_string(),
            connected,
        },
    };

    (status.status_code(), Json(response))
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub health: String,
    pub predict: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<String>,
    pub prediction_logs: String,
}

/// Service banner with an index of the endpoints
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(RootResponse {
        message: "Car Price Prediction API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: Endpoints {
            health: "/health".to_string(),
            predict: "/predict".to_string(),
            metrics: state.metrics_path.clone(),
            prediction_logs: "/prediction-logs/{prediction_id}".to_string(),
        },
    })
}
