//! Strategy selection.
//!
//! The strategy is chosen once, when the cache is built, and captured in a
//! closed enum; call sites never compare strategy names.

use chrono::{DateTime, Utc};
use shared_types::{StorageStrategy, SystemTimeSource, TimeSource};
use std::sync::Arc;
use tracing::debug;

use crate::domain::CacheRecord;
use crate::handler::StorageHandler;
use crate::ports::DurableCache;
use crate::service::{CookieCache, NoOpCache, PersistentCache};

/// Options for [`make_cache`].
#[derive(Clone)]
pub struct CacheOptions {
    /// Cookie `Domain` attribute, normally the apex domain.
    pub domain: Option<String>,
    pub clock: Arc<dyn TimeSource>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            domain: None,
            clock: Arc::new(SystemTimeSource),
        }
    }
}

impl CacheOptions {
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }
}

/// Durable cache over the strategy chosen at construction.
pub enum StorageBackedCache {
    Cookie(CookieCache),
    Persistent(PersistentCache),
    Disabled(NoOpCache),
}

impl StorageBackedCache {
    /// Strategy actually in force (after any downgrade).
    pub fn strategy(&self) -> StorageStrategy {
        match self {
            Self::Cookie(_) => StorageStrategy::Cookie,
            Self::Persistent(_) => StorageStrategy::LocalStorage,
            Self::Disabled(_) => StorageStrategy::Disabled,
        }
    }

    /// Sweep expired records under `prefix`. Only persistent storage needs
    /// it; cookies expire on their own.
    pub fn repair_expired(&self, prefix: &str) -> usize {
        match self {
            Self::Persistent(cache) => cache.repair_expired(prefix),
            Self::Cookie(_) | Self::Disabled(_) => 0,
        }
    }
}

impl DurableCache for StorageBackedCache {
    fn get(&self, key: &str) -> Option<CacheRecord> {
        match self {
            Self::Cookie(cache) => cache.get(key),
            Self::Persistent(cache) => cache.get(key),
            Self::Disabled(cache) => cache.get(key),
        }
    }

    fn set(&self, key: &str, value: &str, expires_at: Option<DateTime<Utc>>) {
        match self {
            Self::Cookie(cache) => cache.set(key, value, expires_at),
            Self::Persistent(cache) => cache.set(key, value, expires_at),
            Self::Disabled(cache) => cache.set(key, value, expires_at),
        }
    }
}

/// Build the cache for `handler`'s strategy.
///
/// Persistent storage that reports itself unavailable falls back to cookies.
pub fn make_cache(handler: Arc<StorageHandler>, options: CacheOptions) -> StorageBackedCache {
    let cache = match handler.strategy() {
        StorageStrategy::Disabled => StorageBackedCache::Disabled(NoOpCache),
        StorageStrategy::LocalStorage if handler.persistent_storage_available() => {
            StorageBackedCache::Persistent(PersistentCache::new(handler, options.clock))
        }
        StorageStrategy::LocalStorage => {
            debug!("Persistent storage unavailable, using cookies");
            StorageBackedCache::Cookie(CookieCache::new(handler, options.domain))
        }
        StorageStrategy::Cookie => {
            StorageBackedCache::Cookie(CookieCache::new(handler, options.domain))
        }
    };
    debug!(strategy = %cache.strategy(), "Durable cache created");
    cache
}
