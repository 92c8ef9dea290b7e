//! Cache key generation strategies

use std::collections::BTreeMap;
use std::fmt::Debug;

use sha2::{Digest, Sha256};

/// Trait for generating cache keys from input data
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Generates a cache key from the given components
    fn generate(&self, params: &CacheKeyParams) -> String;
}

/// Parameters for cache key generation
#[derive(Debug, Clone, Default)]
pub struct CacheKeyParams {
    /// Primary identifier (e.g., the kind of object being keyed)
    pub primary: String,
    /// Secondary components (sorted for consistency)
    pub components: BTreeMap<String, String>,
}

impl CacheKeyParams {
    /// Creates new cache key parameters with a primary identifier
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            components: BTreeMap::new(),
        }
    }

    /// Adds a component to the key parameters
    pub fn with_component(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.insert(key.into(), value.into());
        self
    }

    /// Joins the primary identifier and the sorted components
    pub fn canonical(&self) -> String {
        let mut parts = vec![self.primary.clone()];

        for (k, v) in &self.components {
            parts.push(format!("{}={}", k, v));
        }

        parts.join(":")
    }
}

/// Key generator that hashes the canonical form with SHA-256
///
/// The digest is stable across processes and builds, unlike `DefaultHasher`.
#[derive(Debug, Clone, Default)]
pub struct DigestKeyGenerator;

impl DigestKeyGenerator {
    /// Creates a new digest key generator
    pub fn new() -> Self {
        Self
    }
}

impl CacheKeyGenerator for DigestKeyGenerator {
    fn generate(&self, params: &CacheKeyParams) -> String {
        let digest = Sha256::digest(params.canonical().as_bytes());
        hex::encode(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_params_with_components() {
        let params = CacheKeyParams::new("car")
            .with_component("year", "2014")
            .with_component("engine_cc", "1248");

        assert_eq!(params.primary, "car");
        assert_eq!(params.components.len(), 2);
        assert_eq!(params.components.get("year"), Some(&"2014".to_string()));
    }

    #[test]
    fn test_components_are_sorted() {
        let params = CacheKeyParams::new("test")
            .with_component("zebra", "z")
            .with_component("apple", "a")
            .with_component("mango", "m");

        assert_eq!(params.canonical(), "test:apple=a:mango=m:zebra=z");
    }

    #[test]
    fn test_digest_key_generator() {
        let generator = DigestKeyGenerator::new();
        let params = CacheKeyParams::new("test").with_component("a", "1");

        let key = generator.generate(&params);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, generator.generate(&params.clone()));
    }

    #[test]
    fn test_digest_of_empty_primary_is_sha256_of_empty_string() {
        let key = DigestKeyGenerator::new().generate(&CacheKeyParams::new(""));
        assert_eq!(
            key,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
