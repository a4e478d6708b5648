//! Persistent-storage-backed cache.
//!
//! Persistent storage has no per-key TTL, so each record is a pair: the
//! value under `key` and its expiry under `key_exp`.
//!
//! ## Repair-on-read
//!
//! A read that finds an elapsed marker deletes both records before
//! reporting the key absent. Without this, a later write that does not
//! touch the marker would resurrect a stale value.

use chrono::{DateTime, Utc};
use shared_types::TimeSource;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{decode_expiry, encode_expiry, expiry_key, CacheRecord, EXPIRY_SUFFIX};
use crate::handler::StorageHandler;
use crate::ports::DurableCache;

pub struct PersistentCache {
    handler: Arc<StorageHandler>,
    clock: Arc<dyn TimeSource>,
}

impl PersistentCache {
    pub fn new(handler: Arc<StorageHandler>, clock: Arc<dyn TimeSource>) -> Self {
        Self { handler, clock }
    }

    fn remove_pair(&self, key: &str) {
        self.handler.remove_data_from_persistent(key);
        self.handler.remove_data_from_persistent(&expiry_key(key));
    }

    /// Delete every expired pair whose key starts with `prefix`.
    ///
    /// Returns the number of pairs removed.
    pub fn repair_expired(&self, prefix: &str) -> usize {
        let now = self.clock.now();
        let mut repaired = 0;
        for marker in self.handler.find_similar_in_persistent(prefix) {
            let Some(key) = marker.strip_suffix(EXPIRY_SUFFIX) else {
                continue;
            };
            let expired = self
                .handler
                .get_data_from_persistent(&marker)
                .and_then(|raw| decode_expiry(&raw))
                .is_some_and(|at| at <= now);
            if expired {
                self.remove_pair(key);
                repaired += 1;
            }
        }
        if repaired > 0 {
            debug!(prefix = %prefix, repaired, "Removed expired persistent records");
        }
        repaired
    }
}

impl DurableCache for PersistentCache {
    fn get(&self, key: &str) -> Option<CacheRecord> {
        let expires_at = self
            .handler
            .get_data_from_persistent(&expiry_key(key))
            .and_then(|raw| decode_expiry(&raw));

        if expires_at.is_some_and(|at| at <= self.clock.now()) {
            self.remove_pair(key);
            return None;
        }

        self.handler
            .get_data_from_persistent(key)
            .filter(|data| !data.is_empty())
            .map(|data| CacheRecord::new(data, expires_at))
    }

    fn set(&self, key: &str, value: &str, expires_at: Option<DateTime<Utc>>) {
        self.handler.set_data_in_persistent(key, value);
        match expires_at {
            Some(at) => self
                .handler
                .set_data_in_persistent(&expiry_key(key), &encode_expiry(at)),
            None => self.handler.remove_data_from_persistent(&expiry_key(key)),
        }
    }
}
