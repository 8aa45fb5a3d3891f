//! Cache module - dictionary cache keyed by `{domain}_{locale}`.
//!
//! ## Architecture
//!
//! - `ExternalCache` - pluggable cache capability (get / set with optional timeout)
//! - `MokaCache` - an `ExternalCache` backed by Moka with per-entry expiry
//! - `InMemoryCache` - process-wide map used when no external cache is configured
//! - `TranslationCache` - the layer the service talks to; loads from the
//!   translation source on a miss and stores the result back
//!
//! ## Usage
//!
//! ```rust,ignore
//! let cache = TranslationCache::external(Arc::new(MokaCache::new(CacheConfig::default())), None);
//!
//! // Loads messages_en.json on the first call, served from cache afterwards
//! let dict = cache.get("messages", "en", &store)?;
//! ```

mod config;
mod external;
mod layer;
mod memory;

pub use config::CacheConfig;
pub use external::{ExternalCache, MokaCache};
pub use layer::{cache_key, PreloadReport, TranslationCache};
pub use memory::InMemoryCache;
