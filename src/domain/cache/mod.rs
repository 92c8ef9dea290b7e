//! Cache domain - Generic caching abstraction layer

mod entry;
mod key;
mod repository;

pub use entry::CacheEntry;
pub use key::{CacheKeyGenerator, CacheKeyParams, DigestKeyGenerator};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::MockCache;
