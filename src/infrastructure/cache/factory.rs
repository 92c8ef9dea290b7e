//! Cache factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::disabled::DisabledCache;
use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported cache types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// In-memory cache using moka
    #[default]
    #[serde(alias = "memory", alias = "inmemory")]
    InMemory,
    /// Redis cache
    Redis,
    /// No caching, every lookup misses
    #[serde(alias = "none", alias = "off")]
    Disabled,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
            CacheType::Disabled => write!(f, "disabled"),
        }
    }
}

/// Cache configuration (`[cache]` section)
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Type of cache to create
    #[serde(default)]
    pub backend: CacheType,
    /// Redis URL (required for Redis type)
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Key prefix for namespacing (Redis only)
    #[serde(default)]
    pub key_prefix: Option<String>,
    /// Lifetime of cached predictions
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of entries (in-memory only)
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Redis connection timeout
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Redis per-command timeout
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_operation_timeout_ms() -> u64 {
    500
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheType::InMemory,
            redis_url: None,
            key_prefix: None,
            ttl_secs: default_ttl_secs(),
            max_capacity: default_max_capacity(),
            connect_timeout_ms: default_connect_timeout_ms(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration for in-memory cache
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a new configuration for Redis cache
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: CacheType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Creates a configuration with caching turned off
    pub fn disabled() -> Self {
        Self {
            backend: CacheType::Disabled,
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the entry TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    /// Sets the maximum capacity (in-memory only)
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    /// Sets the Redis connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Factory for creating cache instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    /// Creates a new cache factory
    pub fn new() -> Self {
        Self
    }

    /// Creates a cache instance based on configuration
    pub async fn create(&self, config: &CacheConfig) -> Result<Arc<dyn Cache>, DomainError> {
        match config.backend {
            CacheType::InMemory => {
                let in_memory_config =
                    InMemoryCacheConfig::default().with_max_capacity(config.max_capacity);

                Ok(Arc::new(InMemoryCache::with_config(in_memory_config)))
            }
            CacheType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("Redis URL is required for Redis cache type")
                })?;

                let mut redis_config = RedisCacheConfig::new(url)
                    .with_connection_timeout(config.connect_timeout())
                    .with_operation_timeout(config.operation_timeout());

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                let cache = RedisCache::new(redis_config).await?;
                Ok(Arc::new(cache))
            }
            CacheType::Disabled => Ok(Arc::new(DisabledCache::new())),
        }
    }

    /// Creates the configured cache, degrading to [`DisabledCache`] if the
    /// backing store cannot be reached
    pub async fn create_or_disabled(&self, config: &CacheConfig) -> Arc<dyn Cache> {
        match self.create(config).await {
            Ok(cache) => {
                info!(backend = cache.backend(), "Cache initialized");
                cache
            }
            Err(e) => {
                warn!(
                    backend = %config.backend,
                    error = %e,
                    "Cache unavailable, predictions will not be cached"
                );
                Arc::new(DisabledCache::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[test]
    fn test_cache_type_deserialize() {
        let parse = |s: &str| serde_json::from_str::<CacheType>(&format!("\"{}\"", s)).unwrap();

        assert_eq!(parse("in_memory"), CacheType::InMemory);
        assert_eq!(parse("memory"), CacheType::InMemory);
        assert_eq!(parse("redis"), CacheType::Redis);
        assert_eq!(parse("disabled"), CacheType::Disabled);
        assert_eq!(parse("off"), CacheType::Disabled);
    }

    #[test]
    fn test_cache_type_deserialize_invalid() {
        assert!(serde_json::from_str::<CacheType>("\"memcached\"").is_err());
    }

    #[test]
    fn test_cache_config_defaults() {
        let config: CacheConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.backend, CacheType::InMemory);
        assert_eq!(config.ttl(), Duration::from_secs(3600));
        assert_eq!(config.max_capacity, 10_000);
        assert_eq!(config.operation_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_cache_config_redis() {
        let config = CacheConfig::redis("redis://localhost:6379")
            .with_key_prefix("carprice")
            .with_ttl(Duration::from_secs(600));

        assert_eq!(config.backend, CacheType::Redis);
        assert_eq!(config.redis_url, Some("redis://localhost:6379".to_string()));
        assert_eq!(config.key_prefix, Some("carprice".to_string()));
        assert_eq!(config.ttl_secs, 600);
    }

    #[tokio::test]
    async fn test_factory_create_in_memory() {
        let cache = CacheFactory::new()
            .create(&CacheConfig::in_memory())
            .await
            .unwrap();

        cache
            .set("test", &"value", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("test").await.unwrap();
        assert_eq!(result, Some("value".to_string()));
        assert_eq!(cache.backend(), "in_memory");
    }

    #[tokio::test]
    async fn test_factory_create_disabled() {
        let cache = CacheFactory::new()
            .create(&CacheConfig::disabled())
            .await
            .unwrap();

        assert_eq!(cache.backend(), "disabled");
    }

    #[tokio::test]
    async fn test_factory_create_redis_missing_url() {
        let config = CacheConfig {
            backend: CacheType::Redis,
            redis_url: None,
            ..Default::default()
        };

        let result = CacheFactory::new().create(&config).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_disabled() {
        let config = CacheConfig::redis("redis://127.0.0.1:1")
            .with_connect_timeout(Duration::from_millis(500));

        let cache = CacheFactory::new().create_or_disabled(&config).await;
        assert_eq!(cache.backend(), "disabled");
    }

    #[test]
    fn test_cache_type_display() {
        assert_eq!(CacheType::InMemory.to_string(), "in_memory");
        assert_eq!(CacheType::Redis.to_string(), "redis");
        assert_eq!(CacheType::Disabled.to_string(), "disabled");
    }
}
