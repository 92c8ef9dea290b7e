//! Cache infrastructure - Cache implementations

mod disabled;
mod factory;
mod in_memory;
mod prediction_cache;
mod redis;

pub use disabled::DisabledCache;
pub use factory::{CacheConfig, CacheFactory, CacheType};
pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use prediction_cache::{PredictionCache, PredictionCacheConfig};
pub use redis::{RedisCache, RedisCacheConfig};
