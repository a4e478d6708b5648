//! Capability-checked wrapper over the host storage primitive.
//!
//! ## Failure Handling
//!
//! | Failure | When reported | Effect |
//! |---------|---------------|--------|
//! | Function missing for the strategy | once, at construction | that operation becomes a no-op |
//! | Function raises | on every failing call | call reads as absent / write is dropped |
//!
//! Under [`StorageStrategy::Disabled`] nothing reaches the primitive.

use chrono::{DateTime, Utc};
use shared_bus::ReplayBus;
use shared_types::{ExternalStorage, SameSite, StorageCapability, StorageError, StorageStrategy};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Error-event name used for storage failures.
pub const STORAGE_HANDLER_ERROR: &str = "StorageHandler";

/// Storage primitive wrapper that never fails.
pub struct StorageHandler {
    strategy: StorageStrategy,
    storage: Arc<dyn ExternalStorage>,
    bus: Arc<ReplayBus>,
    provided: HashSet<StorageCapability>,
}

impl fmt::Debug for StorageHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageHandler")
            .field("strategy", &self.strategy)
            .field("provided", &self.provided)
            .finish_non_exhaustive()
    }
}

impl StorageHandler {
    /// Wrap `storage` for `strategy`, reporting each capability the strategy
    /// needs but the primitive lacks.
    pub fn new(
        strategy: StorageStrategy,
        storage: Arc<dyn ExternalStorage>,
        bus: Arc<ReplayBus>,
    ) -> Self {
        let provided: HashSet<StorageCapability> = storage.capabilities().into_iter().collect();

        for capability in strategy.required_capabilities() {
            if !provided.contains(capability) {
                bus.emit_error(
                    STORAGE_HANDLER_ERROR,
                    &StorageError::Unsupported(*capability),
                );
            }
        }

        debug!(
            strategy = %strategy,
            capabilities = provided.len(),
            "Storage handler created"
        );

        Self {
            strategy,
            storage,
            bus,
            provided,
        }
    }

    /// Like [`Self::new`], parsing a configured strategy name.
    pub fn from_strategy_name(
        name: &str,
        storage: Arc<dyn ExternalStorage>,
        bus: Arc<ReplayBus>,
    ) -> Self {
        Self::new(StorageStrategy::parse_or_default(name), storage, bus)
    }

    pub fn strategy(&self) -> StorageStrategy {
        self.strategy
    }

    pub fn bus(&self) -> &Arc<ReplayBus> {
        &self.bus
    }

    pub fn get_cookie(&self, key: &str) -> Option<String> {
        self.call(StorageCapability::GetCookie, None, |s| s.get_cookie(key))
    }

    pub fn set_cookie(
        &self,
        key: &str,
        value: &str,
        expires: Option<DateTime<Utc>>,
        same_site: SameSite,
        domain: Option<&str>,
    ) {
        self.call(StorageCapability::SetCookie, (), |s| {
            s.set_cookie(key, value, expires, same_site, domain)
        });
    }

    pub fn get_data_from_persistent(&self, key: &str) -> Option<String> {
        self.call(StorageCapability::GetFromPersistent, None, |s| {
            s.get_from_persistent(key)
        })
    }

    pub fn set_data_in_persistent(&self, key: &str, value: &str) {
        self.call(StorageCapability::SetInPersistent, (), |s| {
            s.set_in_persistent(key, value)
        });
    }

    pub fn remove_data_from_persistent(&self, key: &str) {
        self.call(StorageCapability::RemovePersistent, (), |s| {
            s.remove_persistent(key)
        });
    }

    pub fn find_similar_in_persistent(&self, prefix: &str) -> Vec<String> {
        self.call(StorageCapability::FindKeysWithPrefix, Vec::new(), |s| {
            s.find_keys_with_prefix(prefix)
        })
    }

    pub fn persistent_storage_available(&self) -> bool {
        self.call(StorageCapability::PersistentStorageAvailable, false, |s| {
            s.persistent_storage_available()
        })
    }

    fn call<T>(
        &self,
        capability: StorageCapability,
        fallback: T,
        op: impl FnOnce(&dyn ExternalStorage) -> Result<T, StorageError>,
    ) -> T {
        if self.strategy == StorageStrategy::Disabled || !self.provided.contains(&capability) {
            return fallback;
        }
        match op(self.storage.as_ref()) {
            Ok(value) => value,
            Err(err) => {
                self.bus.emit_error(STORAGE_HANDLER_ERROR, &err);
                fallback
            }
        }
    }
}
