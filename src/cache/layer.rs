//! Translation cache layer - read-through cache over a translation source.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{ExternalCache, InMemoryCache};
use crate::store::{Dictionary, StoreError, TranslationSource};

/// Cache key for a (domain, locale) pair.
pub fn cache_key(domain: &str, locale: &str) -> String {
    format!("{domain}_{locale}")
}

/// Outcome of a startup preload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub loaded: usize,
    pub missing: usize,
}

/// Dictionary cache, selected once at configuration time.
#[derive(Clone)]
pub enum TranslationCache {
    /// Delegate to a pluggable cache.
    External {
        cache: Arc<dyn ExternalCache>,
        supports_timeout: bool,
        timeout: Option<Duration>,
    },
    /// Process-wide in-memory map.
    InMemory(InMemoryCache),
}

impl TranslationCache {
    /// Use an external cache. `timeout` is passed to `set` only when the
    /// cache reports timeout support.
    pub fn external(cache: Arc<dyn ExternalCache>, timeout: Option<Duration>) -> Self {
        let supports_timeout = cache.supports_timeout();
        if timeout.is_some() && !supports_timeout {
            warn!("Configured cache timeout ignored: external cache does not support timeouts");
        }

        Self::External {
            cache,
            supports_timeout,
            timeout,
        }
    }

    pub fn in_memory() -> Self {
        Self::InMemory(InMemoryCache::new())
    }

    /// Get the dictionary for (domain, locale), loading it from `source`
    /// and storing it on a miss.
    pub fn get(
        &self,
        domain: &str,
        locale: &str,
        source: &dyn TranslationSource,
    ) -> Result<Dictionary, StoreError> {
        let key = cache_key(domain, locale);

        let cached = match self {
            Self::External { cache, .. } => cache.get(&key),
            Self::InMemory(store) => store.get(&key),
        };

        if let Some(dict) = cached {
            return Ok(dict);
        }

        debug!("Cache miss for {}, loading from source", key);
        let dict = source.load(domain, locale)?;
        self.set(domain, locale, Arc::clone(&dict));

        Ok(dict)
    }

    /// Store a dictionary, replacing whatever was cached for the pair.
    pub fn set(&self, domain: &str, locale: &str, dict: Dictionary) {
        let key = cache_key(domain, locale);

        match self {
            Self::External {
                cache,
                supports_timeout,
                timeout,
            } => {
                let timeout = if *supports_timeout { *timeout } else { None };
                cache.set(&key, dict, timeout);
            }
            Self::InMemory(store) => store.set(&key, dict),
        }
    }

    /// Load every (domain, locale) pair into the cache.
    ///
    /// A missing source file is logged and the pair left unpopulated. Any
    /// other load error (unreadable or invalid file) aborts the preload.
    pub fn preload(
        &self,
        domains: &[String],
        locales: &[String],
        source: &dyn TranslationSource,
    ) -> Result<PreloadReport, StoreError> {
        let mut report = PreloadReport::default();

        for domain in domains {
            for locale in locales {
                match source.load(domain, locale) {
                    Ok(dict) => {
                        self.set(domain, locale, dict);
                        report.loaded += 1;
                    }
                    Err(e) if e.is_not_found() => {
                        warn!(
                            "Translations file {}_{}.json not found. Consider running: translations pull <branch>",
                            domain, locale
                        );
                        report.missing += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        info!(
            "Preloaded {} dictionaries ({} missing)",
            report.loaded, report.missing
        );
        Ok(report)
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for TranslationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External {
                supports_timeout,
                timeout,
                ..
            } => f
                .debug_struct("External")
                .field("supports_timeout", supports_timeout)
                .field("timeout", timeout)
                .finish(),
            Self::InMemory(store) => f.debug_tuple("InMemory").field(&store.len()).finish(),
        }
    }
}
