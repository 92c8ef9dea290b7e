//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::observability::MetricsRegistry;
use crate::infrastructure::services::PredictionService;

/// Services shared by every request
///
/// Built once at startup; handlers only ever read it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub prediction_service: Arc<PredictionService>,
    pub metrics: MetricsRegistry,
    /// Where the Prometheus endpoint is mounted, `None` when metrics are off
    pub metrics_path: Option<String>,
}

impl AppState {
    pub fn new(prediction_service: PredictionService, metrics_path: Option<String>) -> Self {
        let metrics = prediction_service.metrics().clone();

        Self {
            prediction_service: Arc::new(prediction_service),
            metrics,
            metrics_path,
        }
    }
}
