//! Always-miss cache used when caching is off or the store is unreachable

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Cache that stores nothing
///
/// Reads always miss and writes are dropped, so callers run with the same
/// code path whether or not a real store is configured.
#[derive(Debug, Default, Clone)]
pub struct DisabledCache;

impl DisabledCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Cache for DisabledCache {
    fn backend(&self) -> &'static str {
        "disabled"
    }

    async fn get_raw(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Ok(None)
    }

    async fn set_raw(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), DomainError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Err(DomainError::cache("Cache is disabled"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[tokio::test]
    async fn test_always_misses() {
        let cache = DisabledCache::new();

        cache.set("key", &"value", Duration::from_secs(60)).await.unwrap();

        let result: Option<String> = cache.get("key").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_reports_not_connected() {
        let cache = DisabledCache::new();

        assert!(cache.ping().await.is_err());
        assert_eq!(cache.backend(), "disabled");
    }
}
