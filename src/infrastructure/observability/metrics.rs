//! Prometheus metrics owned by the application
//!
//! The registry holds its own `PrometheusRecorder` instead of installing a
//! global one, so every instance (and every test) starts from zero.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Label, Level, Metadata, Recorder, SharedString,
    Unit,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusRecorder};

use crate::config::MetricsConfig;
use crate::domain::DomainError;

pub const PREDICTIONS_TOTAL: &str = "predictions_total";
pub const CACHE_HITS_TOTAL: &str = "cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "cache_misses_total";
pub const ERRORS_TOTAL: &str = "errors_total";
pub const PREDICTION_DURATION_SECONDS: &str = "prediction_duration_seconds";
pub const MODEL_LOADED: &str = "model_loaded";
pub const CACHE_CONNECTED: &str = "cache_connected";
pub const APP_INFO: &str = "car_price_api_info";
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Prediction and HTTP metrics rendered in Prometheus text format
///
/// Cheap to clone; all clones share the same recorder and handles.
#[derive(Clone)]
pub struct MetricsRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    recorder: Option<PrometheusRecorder>,
    predictions_total: Counter,
    cache_hits_total: Counter,
    cache_misses_total: Counter,
    prediction_duration: Histogram,
    model_loaded: Gauge,
    cache_connected: Gauge,
}

impl fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl MetricsRegistry {
    /// Creates a registry with its own recorder and the default latency buckets
    pub fn new() -> Result<Self, DomainError> {
        Self::with_buckets(&MetricsConfig::default().latency_buckets)
    }

    /// Creates a registry whose latency histograms use `buckets` (seconds)
    pub fn with_buckets(buckets: &[f64]) -> Result<Self, DomainError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(PREDICTION_DURATION_SECONDS.to_string()),
                buckets,
            )
            .and_then(|b| {
                b.set_buckets_for_metric(
                    Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
                    buckets,
                )
            })
            .map_err(|e| DomainError::configuration(format!("Invalid metric buckets: {}", e)))?
            .build_recorder();

        describe(&recorder);

        let inner = Inner {
            predictions_total: recorder.register_counter(&Key::from_static_name(PREDICTIONS_TOTAL), &METADATA),
            cache_hits_total: recorder.register_counter(&Key::from_static_name(CACHE_HITS_TOTAL), &METADATA),
            cache_misses_total: recorder
                .register_counter(&Key::from_static_name(CACHE_MISSES_TOTAL), &METADATA),
            prediction_duration: recorder
                .register_histogram(&Key::from_static_name(PREDICTION_DURATION_SECONDS), &METADATA),
            model_loaded: recorder.register_gauge(&Key::from_static_name(MODEL_LOADED), &METADATA),
            cache_connected: recorder
                .register_gauge(&Key::from_static_name(CACHE_CONNECTED), &METADATA),
            recorder: Some(recorder),
        };

        let registry = Self {
            inner: Arc::new(inner),
        };
        registry.register_defaults();

        Ok(registry)
    }

    /// Creates a registry whose handles discard every update
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(Inner {
                recorder: None,
                predictions_total: Counter::noop(),
                cache_hits_total: Counter::noop(),
                cache_misses_total: Counter::noop(),
                prediction_duration: Histogram::noop(),
                model_loaded: Gauge::noop(),
                cache_connected: Gauge::noop(),
            }),
        }
    }

    pub fn from_config(config: &MetricsConfig) -> Result<Self, DomainError> {
        if !config.enabled {
            tracing::info!("Prometheus metrics disabled");
            return Ok(Self::disabled());
        }

        let registry = Self::with_buckets(&config.latency_buckets)?;
        tracing::info!("Prometheus metrics initialized at {}", config.path);

        Ok(registry)
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.recorder.is_some()
    }

    fn register_defaults(&self) {
        if let Some(recorder) = &self.inner.recorder {
            let key = Key::from_parts(
                APP_INFO,
                vec![Label::new("version", env!("CARGO_PKG_VERSION"))],
            );
            recorder.register_gauge(&key, &METADATA).set(1.0);

            // Expose the known error types at zero from the start
            for error_type in ["validation", "model_unavailable", "cache_unavailable"] {
                recorder.register_counter(&error_key(error_type), &METADATA);
            }
        }

        self.inner.model_loaded.set(0.0);
        self.inner.cache_connected.set(0.0);
    }

    /// One prediction response was returned to a client
    pub fn prediction_served(&self) {
        self.inner.predictions_total.increment(1);
    }

    pub fn cache_hit(&self) {
        self.inner.cache_hits_total.increment(1);
    }

    pub fn cache_miss(&self) {
        self.inner.cache_misses_total.increment(1);
    }

    /// Counts an error under `errors_total{error_type}`
    pub fn error(&self, error_type: &str) {
        if let Some(recorder) = &self.inner.recorder {
            recorder
                .register_counter(&error_key(error_type), &METADATA)
                .increment(1);
        }
    }

    pub fn observe_prediction_duration(&self, duration: Duration) {
        self.inner
            .prediction_duration
            .record(duration.as_secs_f64());
    }

    pub fn set_model_loaded(&self, loaded: bool) {
        self.inner.model_loaded.set(if loaded { 1.0 } else { 0.0 });
    }

    pub fn set_cache_connected(&self, connected: bool) {
        self.inner
            .cache_connected
            .set(if connected { 1.0 } else { 0.0 });
    }

    /// Records an HTTP request against its route template
    pub fn record_http_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        let Some(recorder) = &self.inner.recorder else {
            return;
        };

        let labels = vec![
            Label::new("method", method.to_string()),
            Label::new("path", route.to_string()),
            Label::new("status", status.to_string()),
        ];

        recorder
            .register_counter(&Key::from_parts(HTTP_REQUESTS_TOTAL, labels.clone()), &METADATA)
            .increment(1);
        recorder
            .register_histogram(
                &Key::from_parts(HTTP_REQUEST_DURATION_SECONDS, labels),
                &METADATA,
            )
            .record(duration.as_secs_f64());
    }

    /// Renders the exposition text; empty when metrics are disabled
    pub fn render(&self) -> String {
        match &self.inner.recorder {
            Some(recorder) => recorder.handle().render(),
            None => String::new(),
        }
    }

    /// Reads one sample from the rendered output, e.g.
    /// `errors_total{error_type="validation"}`
    pub fn sample(&self, series: &str) -> Option<f64> {
        self.render().lines().find_map(|line| {
            let value = line.strip_prefix(series)?.strip_prefix(' ')?;
            value.trim().parse().ok()
        })
    }
}

fn error_key(error_type: &str) -> Key {
    Key::from_parts(
        ERRORS_TOTAL,
        vec![Label::new("error_type", error_type.to_string())],
    )
}

fn describe(recorder: &PrometheusRecorder) {
    let counters = [
        (PREDICTIONS_TOTAL, "Total number of predictions served"),
        (CACHE_HITS_TOTAL, "Total number of prediction cache hits"),
        (CACHE_MISSES_TOTAL, "Total number of prediction cache misses"),
        (ERRORS_TOTAL, "Total number of errors by type"),
        (HTTP_REQUESTS_TOTAL, "Total number of HTTP requests"),
    ];
    for (name, help) in counters {
        recorder.describe_counter(KeyName::from_const_str(name), None, SharedString::const_str(help));
    }

    let histograms = [
        (PREDICTION_DURATION_SECONDS, "Time spent handling a prediction request"),
        (HTTP_REQUEST_DURATION_SECONDS, "HTTP request latency"),
    ];
    for (name, help) in histograms {
        recorder.describe_histogram(
            KeyName::from_const_str(name),
            Some(Unit::Seconds),
            SharedString::const_str(help),
        );
    }

    let gauges = [
        (MODEL_LOADED, "Whether the price model is loaded (1) or not (0)"),
        (CACHE_CONNECTED, "Whether the cache backend is reachable (1) or not (0)"),
        (APP_INFO, "Build information"),
    ];
    for (name, help) in gauges {
        recorder.describe_gauge(KeyName::from_const_str(name), None, SharedString::const_str(help));
    }
}

/// Create the metrics router
pub fn create_metrics_router(path: &str, metrics: MetricsRegistry) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<MetricsRegistry>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        metrics.render(),
    )
}
