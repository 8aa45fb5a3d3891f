//! Cache configuration.

use std::time::Duration;

/// Configuration for a Moka-backed dictionary cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of dictionaries in the cache.
    pub max_capacity: u64,

    /// Expiry for entries stored without an explicit timeout.
    /// `None` keeps them until evicted by capacity.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            ttl: None,
        }
    }
}

impl CacheConfig {
    /// Set max capacity for cache (builder pattern).
    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set the default time-to-live for entries.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }
}
