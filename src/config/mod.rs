//! Configuration module for the translations layer.
//!
//! Loads configuration from environment variables. Every option has a
//! default, so an empty environment yields a working setup.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Environment variable that may carry the provider token.
pub const PROVIDER_TOKEN_VAR: &str = "TRANSLATIONS_PROVIDER_TOKEN";

/// Dictionary cache backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-wide map, entries never expire.
    Memory,
    /// Bounded Moka cache honouring `cache_timeout`.
    Moka,
}

impl Default for CacheBackend {
    fn default() -> Self {
        Self::Memory
    }
}

/// Translations configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Dictionaries
    pub translations_dir: PathBuf,
    pub supported_domains: Vec<String>,
    pub supported_locales: Vec<String>,
    pub fallback_locale: String,

    /// Request header carrying the desired locale.
    pub locale_header: String,

    /// Load every (domain, locale) pair into the cache at startup.
    pub preload: bool,

    // Cache
    pub cache_backend: CacheBackend,
    pub cache_capacity: u64,
    /// Expiry passed to the external cache, when it supports one.
    pub cache_timeout: Option<Duration>,

    // Provider
    pub provider_auth_header: Option<String>,
    /// URL with a `{branch}` placeholder.
    pub provider_url_template: Option<String>,
    pub provider_token: Option<String>,
    pub provider_timeout: Duration,

    /// Listen address for `serve`.
    pub bind_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translations_dir: PathBuf::from("translations"),
            supported_domains: vec!["messages".to_string()],
            supported_locales: vec!["en".to_string()],
            fallback_locale: "en".to_string(),
            locale_header: "SELECTED-LOCALE".to_string(),
            preload: true,
            cache_backend: CacheBackend::default(),
            cache_capacity: 1_000,
            cache_timeout: None,
            provider_auth_header: None,
            provider_url_template: None,
            provider_token: None,
            provider_timeout: Duration::from_secs(20),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            translations_dir: var("TRANSLATIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.translations_dir),
            supported_domains: var("SUPPORTED_DOMAINS")
                .map(|s| parse_list(&s))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.supported_domains),
            supported_locales: var("SUPPORTED_LOCALES")
                .map(|s| parse_list(&s))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.supported_locales),
            fallback_locale: var("FALLBACK_LOCALE").unwrap_or(defaults.fallback_locale),
            locale_header: var("TRANSLATIONS_HEADER").unwrap_or(defaults.locale_header),
            preload: var("TRANSLATIONS_PRELOAD")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.preload),
            cache_backend: match var("TRANSLATIONS_CACHE").map(|s| s.to_lowercase()).as_deref() {
                Some("moka") => CacheBackend::Moka,
                _ => CacheBackend::Memory,
            },
            cache_capacity: var("TRANSLATIONS_CACHE_CAPACITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cache_capacity),
            cache_timeout: var("TRANSLATIONS_CACHE_TIMEOUT")
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs),
            provider_auth_header: var("TRANSLATIONS_PROVIDER_AUTH_HEADER"),
            provider_url_template: var("TRANSLATIONS_PROVIDER_URL_TEMPLATE"),
            provider_token: var(PROVIDER_TOKEN_VAR),
            provider_timeout: var("TRANSLATIONS_PROVIDER_TIMEOUT")
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.provider_timeout),
            bind_addr: var("TRANSLATIONS_BIND_ADDR")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.bind_addr),
        }
    }

    /// Provider token from config, or from the environment if unset.
    pub fn provider_token(&self) -> Option<String> {
        self.provider_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| var(PROVIDER_TOKEN_VAR))
    }
}

/// Read a variable, treating empty values as unset.
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a comma-separated list, dropping empty items.
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
