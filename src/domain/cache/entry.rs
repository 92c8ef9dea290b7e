//! Cached prediction entry

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached price for one fingerprint
///
/// Entries are written once on a cache miss and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub predicted_price: f64,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry that expires `ttl` after now
    pub fn new(
        fingerprint: impl Into<String>,
        predicted_price: f64,
        model_version: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let created_at = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = created_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            fingerprint: fingerprint.into(),
            predicted_price,
            model_version: model_version.into(),
            created_at,
            expires_at,
        }
    }

    /// Whether the entry is expired at the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
