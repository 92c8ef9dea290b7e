//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Generic cache trait for key-value operations with TTL support
///
/// This trait uses JSON strings internally to be dyn-compatible.
/// Use the helper methods for typed get/set operations.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Short backend name reported by health checks
    fn backend(&self) -> &'static str;

    /// Gets a raw JSON value from the cache
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value in the cache with a TTL
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Verifies the backing store is reachable
    async fn ping(&self) -> Result<(), DomainError>;
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the cache with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}
