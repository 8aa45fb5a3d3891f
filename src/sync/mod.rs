//! Sync module - pull translations from the provider into local files.
//!
//! A pull runs: token check -> fetch -> parse -> shape check -> per-entry
//! write -> summary. Every entry is written atomically, but entries are
//! independent: a failure midway leaves earlier files updated.

mod payload;
mod provider;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::TranslationCache;
use crate::config::Config;
use crate::store::{FileStore, StoreError};

pub use payload::{entries, PayloadEntry};
pub use provider::{branch_url, fetch};

/// Fatal pull errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(
        "Missing TRANSLATIONS_PROVIDER_TOKEN. Set it in the configuration or as an environment variable."
    )]
    MissingToken,

    #[error("Missing TRANSLATIONS_PROVIDER_URL_TEMPLATE.")]
    MissingUrlTemplate,

    #[error("Missing TRANSLATIONS_PROVIDER_AUTH_HEADER.")]
    MissingAuthHeader,

    #[error("Invalid provider URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request failed: provider answered {0}")]
    Status(reqwest::StatusCode),

    #[error("Invalid JSON from server: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Unexpected response type: {found} (expected object)")]
    UnexpectedShape { found: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Arguments of a pull.
#[derive(Debug, Clone)]
pub struct PullOptions {
    pub branch: String,
    /// Overwrite files that already exist.
    pub force: bool,
}

/// What happened to one (domain, locale) entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    Written,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullEntry {
    pub domain: String,
    pub locale: String,
    pub path: PathBuf,
    pub outcome: PullOutcome,
}

impl fmt::Display for PullEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            PullOutcome::Written => write!(
                f,
                "pull  {}/{} -> {}",
                self.domain,
                self.locale,
                self.path.display()
            ),
            PullOutcome::Skipped => write!(
                f,
                "skip  {}/{} (exists, use --force): {}",
                self.domain,
                self.locale,
                self.path.display()
            ),
        }
    }
}

/// Counts reported at the end of a pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullSummary {
    pub written: usize,
    pub skipped: usize,
}

impl fmt::Display for PullSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Done. Written: {}, skipped: {}", self.written, self.skipped)
    }
}

/// Pulls provider payloads into the translations directory.
#[derive(Debug, Clone)]
pub struct Puller {
    config: Config,
    store: FileStore,
    cache: Option<TranslationCache>,
}

impl Puller {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            store: FileStore::new(config.translations_dir.clone()),
            cache: None,
        }
    }

    /// Refresh this cache for every written entry.
    ///
    /// Only processes sharing this cache see the refresh: an external cache
    /// they also use, or the in-process cache of the same process.
    #[must_use]
    pub fn with_cache(mut self, cache: TranslationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Fetch and apply the payload for `options.branch`.
    ///
    /// `on_entry` is called after each entry is written or skipped.
    pub async fn pull<F>(&self, options: &PullOptions, on_entry: F) -> Result<PullSummary, SyncError>
    where
        F: FnMut(&PullEntry),
    {
        let payload = fetch(&self.config, &options.branch).await?;
        self.apply(&payload, options.force, on_entry)
    }

    /// Write every valid entry of `payload`.
    pub fn apply<F>(&self, payload: &Value, force: bool, mut on_entry: F) -> Result<PullSummary, SyncError>
    where
        F: FnMut(&PullEntry),
    {
        let entries = entries(payload)?;
        self.store.ensure_dir()?;
        let mut summary = PullSummary::default();

        for entry in entries {
            let path = self.store.path_for(entry.domain, entry.locale);

            let outcome = if path.exists() && !force {
                summary.skipped += 1;
                PullOutcome::Skipped
            } else {
                self.store
                    .write_atomic(entry.domain, entry.locale, entry.translations)?;

                if let Some(cache) = &self.cache {
                    let dict = entry
                        .translations
                        .iter()
                        .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                        .collect();
                    cache.set(entry.domain, entry.locale, Arc::new(dict));
                    debug!("Refreshed cache for {}/{}", entry.domain, entry.locale);
                }

                summary.written += 1;
                PullOutcome::Written
            };

            on_entry(&PullEntry {
                domain: entry.domain.to_string(),
                locale: entry.locale.to_string(),
                path,
                outcome,
            });
        }

        info!(
            "Pull finished: {} written, {} skipped",
            summary.written, summary.skipped
        );
        Ok(summary)
    }
}
