//! Observability infrastructure - Tracing and Metrics

mod metrics;
mod tracing_setup;

pub use metrics::{
    create_metrics_router, MetricsRegistry, CACHE_CONNECTED, CACHE_HITS_TOTAL,
    CACHE_MISSES_TOTAL, ERRORS_TOTAL, MODEL_LOADED, PREDICTIONS_TOTAL,
    PREDICTION_DURATION_SECONDS,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
