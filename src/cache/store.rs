// Cache entries.
// Wraps a fetched value with the time it was stored and its invalidation flag.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached.
    pub cached_at: DateTime<Utc>,
    /// Set by an explicit invalidation; forces the next read to refetch.
    pub invalidated: bool,
}

impl<T> CachedData<T> {
    /// Create a new cached data entry.
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
            invalidated: false,
        }
    }

    /// Check if this cached data has expired based on TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        if self.invalidated {
            return true;
        }

        let elapsed = Utc::now()
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::ZERO);

        elapsed > ttl
    }

    /// Check if this cached data is still valid (not expired).
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.is_expired(ttl)
    }

    /// Mark as outdated without discarding the value.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_is_valid() {
        let data = CachedData::new("test");
        assert!(data.is_valid(Duration::from_secs(300)));
    }

    #[test]
    fn test_invalidated_expires_immediately() {
        let mut data = CachedData::new("test");
        data.invalidate();

        assert!(data.is_expired(Duration::MAX));
        assert_eq!(data.data, "test");
    }

    #[test]
    fn test_mutable_expires() {
        let mut data = CachedData::new("test");

        // Set cached_at to the past
        data.cached_at = Utc::now() - chrono::Duration::seconds(600);

        // Should be expired with 5 minute TTL
        assert!(data.is_expired(Duration::from_secs(300)));
        assert!(!data.is_valid(Duration::from_secs(300)));
        // But not with the 10 minute user TTL
        data.cached_at = Utc::now() - chrono::Duration::seconds(400);
        assert!(data.is_valid(Duration::from_secs(600)));
    }
}
