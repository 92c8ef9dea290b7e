//! In-memory cache implementation using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::Expiry;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl InMemoryCacheConfig {
    /// Creates a new configuration with specified max capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Value stored in moka
#[derive(Debug, Clone)]
struct StoredValue {
    /// Serialized JSON value
    data: String,
    /// Expiration timestamp (millis since epoch)
    expires_at: u64,
    /// Lifetime requested by the writer
    ttl: Duration,
}

/// Lets moka evict each entry after its own TTL
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: std::time::Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Thread-safe in-memory cache implementation using moka
///
/// Entries are bounded by `max_capacity` (LRU-like eviction) and carry their
/// own expiry: moka evicts them in the background and reads check it eagerly.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, StoredValue>,
}

impl InMemoryCache {
    /// Creates a new in-memory cache with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    /// Creates a new in-memory cache with the given configuration
    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    fn current_time_millis() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn is_expired(value: &StoredValue) -> bool {
        Self::current_time_millis() > value.expires_at
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    fn backend(&self) -> &'static str {
        "in_memory"
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        match self.cache.get(key).await {
            Some(value) => {
                if Self::is_expired(&value) {
                    self.cache.remove(key).await;
                    return Ok(None);
                }

                Ok(Some(value.data))
            }
            None => Ok(None),
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let expires_at = Self::current_time_millis() + ttl.as_millis() as u64;
        let stored = StoredValue {
            data: value.to_string(),
            expires_at,
            ttl,
        };

        self.cache.insert(key.to_string(), stored).await;
        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = InMemoryCache::new();

        let result: Option<String> = cache.get("missing").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_value() {
        let cache = InMemoryCache::new();

        cache.set("key1", &1, Duration::from_secs(60)).await.unwrap();
        cache.set("key1", &2, Duration::from_secs(60)).await.unwrap();

        let result: Option<i32> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some(2));
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = InMemoryCache::new();

        // Set with very short TTL
        cache
            .set("key1", &"value1", Duration::from_millis(50))
            .await
            .unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert!(result.is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_capacity_bound() {
        let cache = InMemoryCache::with_config(InMemoryCacheConfig::default().with_max_capacity(10));

        for i in 0..100 {
            cache
                .set(&format!("key{}", i), &i, Duration::from_secs(60))
                .await
                .unwrap();
        }

        cache.cache.run_pending_tasks().await;
        assert!(cache.cache.entry_count() <= 10);
    }

    #[tokio::test]
    async fn test_ping_and_backend() {
        let cache = InMemoryCache::new();

        assert!(cache.ping().await.is_ok());
        assert_eq!(cache.backend(), "in_memory");
    }
}
