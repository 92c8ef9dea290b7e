use std::path::PathBuf;

use serde::Deserialize;

use crate::infrastructure::cache::CacheConfig;

/// Environment prefix for overrides such as `APP__CACHE__BACKEND=redis`
const ENV_PREFIX: &str = "APP";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where the model artifact lives and how strictly it is required
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
    #[serde(default = "default_schema_path")]
    pub schema_path: PathBuf,
    /// Overrides the version recorded in the model file
    #[serde(default)]
    pub version: Option<String>,
    /// Refuse to start without a usable model
    #[serde(default = "default_true")]
    pub required: bool,
}

/// `[observability]`: OTLP span export and the Prometheus endpoint
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub tracing: TracingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracingConfig {
    /// Export spans over OTLP/gRPC
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Clamped to `[0, 1]` when the sampler is built
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// When false the registry is a no-op and the endpoint is not mounted
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
    /// Histogram buckets (seconds) for prediction and HTTP latency
    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/rf_model.json")
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("models/feature_info.json")
}

fn default_true() -> bool {
    true
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "car-price-api".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_latency_buckets() -> Vec<f64> {
    vec![
        0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            schema_path: default_schema_path(),
            version: None,
            required: true,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: default_otlp_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_metrics_path(),
            latency_buckets: default_latency_buckets(),
        }
    }
}

impl AppConfig {
    /// Loads `config/default`, `config/local`, then `APP__*` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(Self::environment())
    }

    /// Environment variables are kept as strings; serde converts the numeric
    /// and boolean fields, so values like `APP__MODEL__VERSION=1.0` survive
    /// verbatim.
    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX).separator("__")
    }

    fn load_with(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(environment)
            .build()?;

        config.try_deserialize()
    }
}
