//! The translations service.
//!
//! Owns configuration, the locale resolver, the dictionary cache and the
//! translation source. One instance is shared by the whole process; each
//! request gets its own [`RequestContext`].

use std::sync::Arc;

use axum::http::HeaderMap;
use thiserror::Error;
use tracing::debug;

use crate::cache::{CacheConfig, ExternalCache, MokaCache, PreloadReport, TranslationCache};
use crate::config::{CacheBackend, Config};
use crate::context::RequestContext;
use crate::locale::LocaleResolver;
use crate::store::{FileStore, StoreError, TranslationSource};

/// Errors raised while setting up a request.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Request-scoped translations service.
pub struct Translations {
    config: Config,
    resolver: LocaleResolver,
    cache: TranslationCache,
    source: Arc<dyn TranslationSource>,
}

impl Translations {
    /// File-backed service with the in-memory cache.
    pub fn new(config: Config) -> Self {
        let source = Arc::new(FileStore::new(config.translations_dir.clone()));
        let resolver = LocaleResolver::from_config(&config);

        Self {
            config,
            resolver,
            cache: TranslationCache::in_memory(),
            source,
        }
    }

    /// Service with the cache backend named in `config`.
    pub fn from_config(config: Config) -> Self {
        match config.cache_backend {
            CacheBackend::Memory => Self::new(config),
            CacheBackend::Moka => {
                let moka = MokaCache::new(CacheConfig::default().max_capacity(config.cache_capacity));
                Self::new(config).with_external_cache(Arc::new(moka))
            }
        }
    }

    /// Use an external cache instead of the in-memory one.
    #[must_use]
    pub fn with_external_cache(mut self, cache: Arc<dyn ExternalCache>) -> Self {
        self.cache = TranslationCache::external(cache, self.config.cache_timeout);
        self
    }

    /// Load dictionaries from another source.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn TranslationSource>) -> Self {
        self.source = source;
        self
    }

    /// Preload every configured (domain, locale) pair when enabled.
    ///
    /// Missing files are skipped; an unreadable or invalid file fails.
    pub fn init(&self) -> Result<Option<PreloadReport>, StoreError> {
        if !self.config.preload {
            debug!("Translations preload disabled");
            return Ok(None);
        }

        let report = self.cache.preload(
            &self.config.supported_domains,
            &self.config.supported_locales,
            self.source.as_ref(),
        )?;
        Ok(Some(report))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn resolver(&self) -> &LocaleResolver {
        &self.resolver
    }

    /// Resolve the locale from request headers and load its dictionaries.
    pub fn begin_request(&self, headers: &HeaderMap) -> Result<RequestContext, TranslationError> {
        let locale = self.resolver.resolve(headers);
        self.context_for(&locale)
    }

    /// Build a request context for an already resolved locale.
    ///
    /// Unsupported locales are replaced by the fallback locale.
    pub fn context_for(&self, locale: &str) -> Result<RequestContext, TranslationError> {
        let locale = self.resolver.resolve_value(Some(locale));
        let fallback_locale = self.resolver.fallback();

        let mut ctx = RequestContext::new(locale.clone());

        for domain in &self.config.supported_domains {
            let primary = self.cache.get(domain, &locale, self.source.as_ref())?;

            let fallback = if locale == fallback_locale {
                Arc::clone(&primary)
            } else {
                self.cache.get(domain, fallback_locale, self.source.as_ref())?
            };

            ctx.insert_domain(domain.clone(), primary, fallback);
        }

        debug!("Request context ready for locale {}", locale);
        Ok(ctx)
    }
}

impl std::fmt::Debug for Translations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translations")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Translations) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("messages_en.json"),
            r#"{"hello": "Hello", "bye": "Goodbye", "greet": "Hi {name}"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("messages_fr.json"),
            r#"{"hello": "Bonjour"}"#,
        )
        .unwrap();

        let config = Config {
            translations_dir: dir.path().to_path_buf(),
            supported_locales: vec!["en".to_string(), "fr".to_string()],
            ..Config::default()
        };

        (dir, Translations::new(config))
    }

    #[test]
    fn test_begin_request_with_header() {
        let (_dir, translations) = setup();
        let mut headers = HeaderMap::new();
        headers.insert("SELECTED-LOCALE", HeaderValue::from_static("fr"));

        let ctx = translations.begin_request(&headers).unwrap();

        assert_eq!(ctx.locale(), "fr");
        assert_eq!(ctx.t("hello"), "Bonjour");
        assert_eq!(ctx.t("bye"), "Goodbye");
        assert_eq!(ctx.t("unknown"), "unknown");
    }

    #[test]
    fn test_fallback_locale_shares_dictionary() {
        let (_dir, translations) = setup();

        let ctx = translations.begin_request(&HeaderMap::new()).unwrap();
        let dicts = ctx.domain("messages").unwrap();

        assert_eq!(ctx.locale(), "en");
        assert!(Arc::ptr_eq(&dicts.primary, &dicts.fallback));
    }

    #[test]
    fn test_fallback_matches_cache_entry() {
        let (_dir, translations) = setup();

        let ctx = translations.context_for("fr").unwrap();
        let cached = translations
            .cache()
            .get("messages", "en", &FileStore::new("unused"))
            .unwrap();

        assert_eq!(*ctx.domain("messages").unwrap().fallback, *cached);
    }

    #[test]
    fn test_moka_backend_from_config() {
        let (dir, _) = setup();
        let translations = Translations::from_config(Config {
            translations_dir: dir.path().to_path_buf(),
            cache_backend: CacheBackend::Moka,
            cache_timeout: Some(std::time::Duration::from_secs(60)),
            ..Config::default()
        });

        assert!(matches!(
            translations.cache(),
            TranslationCache::External { supports_timeout: true, .. }
        ));
        assert_eq!(translations.context_for("en").unwrap().t("hello"), "Hello");
    }

    #[test]
    fn test_custom_source() {
        struct Static;

        impl TranslationSource for Static {
            fn load(&self, _domain: &str, locale: &str) -> Result<crate::store::Dictionary, StoreError> {
                let dict = [("locale".to_string(), locale.to_string())].into_iter().collect();
                Ok(Arc::new(dict))
            }
        }

        let translations = Translations::new(Config {
            supported_locales: vec!["en".to_string(), "fr".to_string()],
            ..Config::default()
        })
        .with_source(Arc::new(Static));

        let ctx = translations.context_for("fr").unwrap();
        assert_eq!(ctx.t("locale"), "fr");
        assert_eq!(translations.resolver().fallback(), "en");
    }

    #[test]
    fn test_missing_file_fails_request_setup() {
        let dir = TempDir::new().unwrap();
        let translations = Translations::new(Config {
            translations_dir: dir.path().to_path_buf(),
            ..Config::default()
        });

        let err = translations.begin_request(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, TranslationError::Store(ref e) if e.is_not_found()));
    }

    #[test]
    fn test_init_fails_on_invalid_file() {
        let (dir, _) = setup();
        fs::write(dir.path().join("messages_fr.json"), "[\"not\", \"a map\"]").unwrap();
        let translations = Translations::new(Config {
            translations_dir: dir.path().to_path_buf(),
            supported_locales: vec!["en".to_string(), "fr".to_string()],
            ..Config::default()
        });

        let err = translations.init().unwrap_err();

        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn test_init_respects_preload_flag() {
        let (dir, _) = setup();
        let translations = Translations::new(Config {
            translations_dir: dir.path().to_path_buf(),
            supported_locales: vec!["en".to_string(), "fr".to_string(), "de".to_string()],
            ..Config::default()
        });

        let report = translations.init().unwrap().unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(report.missing, 1);

        let disabled = Translations::new(Config {
            preload: false,
            ..Config::default()
        });
        assert!(disabled.init().unwrap().is_none());
    }
}
