use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::predict;
use super::state::AppState;
use crate::infrastructure::observability::create_metrics_router;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    let metrics = state.metrics.clone();
    let metrics_path = state.metrics_path.clone();

    let mut router = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/predict", post(predict::predict))
        .route(
            "/prediction-logs/{prediction_id}",
            get(predict::get_prediction_log),
        )
        .with_state(state);

    if let Some(path) = metrics_path {
        router = router.merge(create_metrics_router(&path, metrics.clone()));
    }

    router
        .route_layer(middleware::from_fn_with_state(metrics, metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        // The dashboard calls the API from another origin
        .layer(CorsLayer::permissive())
}
