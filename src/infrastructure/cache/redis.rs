//! Redis cache implementation

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    /// Connection timeout
    pub connection_timeout: Duration,
    /// Upper bound for a single command
    pub operation_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
            connection_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_millis(500),
        }
    }
}

impl RedisCacheConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the per-command timeout
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

/// Redis cache implementation
///
/// Uses a `ConnectionManager`, which reconnects on its own after the server
/// goes away. Every command is bounded by `operation_timeout` so a stalled
/// server degrades into fast cache errors.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCache {
    /// Creates a new Redis cache connection
    pub async fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = tokio::time::timeout(config.connection_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                DomainError::cache(format!(
                    "Timed out connecting to Redis after {:?}",
                    config.connection_timeout
                ))
            })?
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    async fn bounded<T>(
        &self,
        action: &str,
        key: &str,
        command: impl Future<Output = Result<T, RedisError>>,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.config.operation_timeout, command).await {
            Ok(result) => result.map_err(|e| {
                DomainError::cache(format!("Failed to {} key '{}': {}", action, key, e))
            }),
            Err(_) => Err(DomainError::cache(format!(
                "Timed out trying to {} key '{}'",
                action, key
            ))),
        }
    }
}

/// `PSETEX` argument; Redis rejects a zero expiry
fn expiry_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl Cache for RedisCache {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        self.bounded("get", key, conn.get(&prefixed_key)).await
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        self.bounded(
            "set",
            key,
            conn.pset_ex(&prefixed_key, value, expiry_millis(ttl)),
        )
        .await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: String = self
            .bounded("ping", "-", redis::cmd("PING").query_async(&mut conn))
            .await?;

        Ok(())
    }
}
