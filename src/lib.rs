//! Translations - request-scoped JSON translations for axum services.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `store` - Per-(domain, locale) JSON dictionaries on disk
//! - `cache` - Dictionary cache (external or in-process)
//! - `locale` - Locale resolution from a request header
//! - `context` - Per-request dictionaries and the lookup function
//! - `translator` - The service tying the pieces together
//! - `filter` - Template filter entry point
//! - `web` - axum middleware and extractor
//! - `sync` - Pull command for the translations provider

pub mod cache;
pub mod config;
pub mod context;
pub mod filter;
pub mod locale;
pub mod store;
pub mod sync;
pub mod translator;
pub mod web;

pub use cache::{ExternalCache, InMemoryCache, MokaCache, TranslationCache};
pub use config::Config;
pub use context::{RequestContext, DEFAULT_DOMAIN};
pub use locale::LocaleResolver;
pub use store::{Dictionary, FileStore, StoreError, TranslationSource};
pub use sync::{PullOptions, PullSummary, Puller, SyncError};
pub use translator::{TranslationError, Translations};
