//! Deterministic cache key for a feature vector

use std::fmt;

use serde::{Deserialize, Serialize};

use super::features::FeatureVector;
use crate::domain::cache::{CacheKeyGenerator, CacheKeyParams, DigestKeyGenerator};

/// Primary component of the canonical fingerprint string
const FINGERPRINT_KIND: &str = "car";

/// SHA-256 digest (hex) of a feature vector's canonical form
///
/// Depends only on the feature values: field order is fixed by sorting on the
/// field name, and nothing time- or process-dependent is mixed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(vector: &FeatureVector) -> Self {
        let params = vector
            .fields()
            .into_iter()
            .fold(CacheKeyParams::new(FINGERPRINT_KIND), |params, (name, value)| {
                params.with_component(name, value)
            });

        Self(DigestKeyGenerator::new().generate(&params))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
