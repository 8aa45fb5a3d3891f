//! External cache capability and its Moka-backed implementation.

use std::fmt;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;

use super::CacheConfig;
use crate::store::Dictionary;

/// A pluggable key-value cache for dictionaries.
///
/// Implementors that honour the `timeout` passed to [`set`](Self::set)
/// report it through [`supports_timeout`](Self::supports_timeout); the
/// translation layer reads that flag once, when it is built.
pub trait ExternalCache: Send + Sync {
    /// Get a dictionary, or `None` on a miss.
    fn get(&self, key: &str) -> Option<Dictionary>;

    /// Store a dictionary, replacing any previous one.
    fn set(&self, key: &str, value: Dictionary, timeout: Option<Duration>);

    /// Whether `set` honours its `timeout` argument.
    fn supports_timeout(&self) -> bool {
        false
    }
}

#[derive(Clone)]
struct Entry {
    dict: Dictionary,
    ttl: Option<Duration>,
}

/// Reads each entry's own time-to-live.
struct EntryExpiry {
    default_ttl: Option<Duration>,
}

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        value.ttl.or(self.default_ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl.or(self.default_ttl)
    }
}

/// Moka-backed external cache.
///
/// This cache is:
/// - Thread-safe and clone-friendly (clones share the same underlying cache)
/// - Bounded by `max_capacity`
/// - Expiring per entry, using the timeout given to `set`
#[derive(Clone)]
pub struct MokaCache {
    inner: Cache<String, Entry>,
}

impl MokaCache {
    /// Create a new cache with the given config.
    pub fn new(config: CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry {
                default_ttl: config.ttl,
            })
            .build();

        Self { inner }
    }

    /// Remove a key from the cache.
    pub fn invalidate(&self, key: &str) {
        self.inner.invalidate(key);
    }

    /// Get the number of entries in the cache.
    ///
    /// Note: This may not be perfectly accurate due to concurrent operations.
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for MokaCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ExternalCache for MokaCache {
    fn get(&self, key: &str) -> Option<Dictionary> {
        self.inner.get(key).map(|entry| entry.dict)
    }

    fn set(&self, key: &str, value: Dictionary, timeout: Option<Duration>) {
        self.inner.insert(
            key.to_string(),
            Entry {
                dict: value,
                ttl: timeout,
            },
        );
    }

    fn supports_timeout(&self) -> bool {
        true
    }
}

impl fmt::Debug for MokaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MokaCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn dict(pairs: &[(&str, &str)]) -> Dictionary {
        Arc::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn test_set_then_get() {
        let cache = MokaCache::default();
        cache.set("messages_en", dict(&[("hello", "Hi")]), None);

        let got = cache.get("messages_en").unwrap();
        assert_eq!(got.get("hello").map(String::as_str), Some("Hi"));
        assert!(cache.get("messages_fr").is_none());
    }

    #[test]
    fn test_set_replaces_whole_dictionary() {
        let cache = MokaCache::default();
        cache.set("messages_en", dict(&[("a", "1"), ("b", "2")]), None);
        cache.set("messages_en", dict(&[("c", "3")]), None);

        let got = cache.get("messages_en").unwrap();
        assert_eq!(got.len(), 1);
        assert!(got.get("a").is_none());
    }

    #[test]
    fn test_timeout_expires_entry() {
        let cache = MokaCache::default();
        cache.set("messages_en", dict(&[("hello", "Hi")]), Some(Duration::from_millis(50)));

        std::thread::sleep(Duration::from_millis(200));

        assert!(cache.get("messages_en").is_none());
    }

    #[test]
    fn test_default_ttl_applies_without_timeout() {
        let cache = MokaCache::new(CacheConfig::default().ttl(Duration::from_millis(50)));
        cache.set("messages_en", dict(&[("hello", "Hi")]), None);

        std::thread::sleep(Duration::from_millis(200));

        assert!(cache.get("messages_en").is_none());
    }

    #[test]
    fn test_invalidate() {
        let cache = MokaCache::default();
        cache.set("messages_en", dict(&[]), None);
        cache.invalidate("messages_en");

        assert!(cache.get("messages_en").is_none());
        assert_eq!(cache.entry_count(), 0);
    }
}
