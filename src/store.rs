//! Translation store - JSON dictionaries on disk.
//!
//! One file per (domain, locale): `{dir}/{domain}_{locale}.json`, holding a
//! flat object of key -> translation template.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// A loaded translation dictionary (key -> template).
///
/// Immutable once loaded; a refresh replaces the whole dictionary.
pub type Dictionary = Arc<HashMap<String, String>>;

/// Errors raised while reading or writing dictionaries.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("translations file {domain}_{locale}.json not found at {}", path.display())]
    NotFound {
        domain: String,
        locale: String,
        path: PathBuf,
    },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid translations file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode translations for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Anything that can produce a full dictionary for a (domain, locale) pair.
pub trait TranslationSource: Send + Sync {
    fn load(&self, domain: &str, locale: &str) -> Result<Dictionary, StoreError>;
}

/// File-backed translation store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `domain` in `locale`.
    pub fn path_for(&self, domain: &str, locale: &str) -> PathBuf {
        self.dir.join(format!("{domain}_{locale}.json"))
    }

    /// Create the translations directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Write a dictionary so that readers only ever see a complete file.
    ///
    /// Keys are sorted, indented by two spaces, non-ASCII is kept verbatim
    /// and the file ends with a newline. The content goes to a `.tmp`
    /// sibling first and is then renamed over the target.
    pub fn write_atomic(
        &self,
        domain: &str,
        locale: &str,
        translations: &Map<String, Value>,
    ) -> Result<PathBuf, StoreError> {
        self.ensure_dir()?;

        let path = self.path_for(domain, locale);
        let tmp_path = path.with_extension("json.tmp");

        let sorted: BTreeMap<&String, &Value> = translations.iter().collect();
        let mut body = serde_json::to_string_pretty(&sorted).map_err(|source| {
            StoreError::Encode {
                path: path.clone(),
                source,
            }
        })?;
        body.push('\n');

        let io_err = |source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        };

        let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(body.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(&tmp_path, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

impl TranslationSource for FileStore {
    fn load(&self, domain: &str, locale: &str) -> Result<Dictionary, StoreError> {
        let path = self.path_for(domain, locale);

        let raw = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound {
                    domain: domain.to_string(),
                    locale: locale.to_string(),
                    path: path.clone(),
                }
            } else {
                StoreError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let dict: HashMap<String, String> = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Parse { path: path.clone(), source })?;

        debug!("Loaded {} keys from {}", dict.len(), path.display());
        Ok(Arc::new(dict))
    }
}
