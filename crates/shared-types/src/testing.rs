//! In-memory storage primitive for tests.
//!
//! Models the parts of browser storage the core depends on: a cookie jar
//! that only accepts certain `Domain` attributes, expiring cookies, a
//! persistent map, missing host functions and injected failures.

use crate::errors::{StorageCapability, StorageError};
use crate::storage::{ExternalStorage, SameSite};
use crate::time::{SystemTimeSource, TimeSource};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// A cookie as stored in the jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub value: String,
    pub expires: Option<DateTime<Utc>>,
    pub domain: Option<String>,
    pub same_site: SameSite,
}

/// In-memory [`ExternalStorage`].
pub struct InMemoryStorage {
    cookies: Mutex<HashMap<String, StoredCookie>>,
    persistent: Mutex<BTreeMap<String, String>>,
    /// `None` accepts every `Domain` attribute.
    accepted_domains: Option<HashSet<String>>,
    cookies_enabled: bool,
    persistent_available: bool,
    capabilities: Vec<StorageCapability>,
    failing: Mutex<HashSet<StorageCapability>>,
    cookie_writes: Mutex<Vec<(String, Option<String>)>>,
    clock: Arc<dyn TimeSource>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Storage providing every capability and accepting every cookie.
    pub fn new() -> Self {
        Self {
            cookies: Mutex::new(HashMap::new()),
            persistent: Mutex::new(BTreeMap::new()),
            accepted_domains: None,
            cookies_enabled: true,
            persistent_available: true,
            capabilities: StorageCapability::ALL.to_vec(),
            failing: Mutex::new(HashSet::new()),
            cookie_writes: Mutex::new(Vec::new()),
            clock: Arc::new(SystemTimeSource),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Only accept domain-scoped cookies for these domains (leading dot optional).
    pub fn accepting_cookie_domains(mut self, domains: &[&str]) -> Self {
        self.accepted_domains = Some(
            domains
                .iter()
                .map(|d| d.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        );
        self
    }

    /// Silently drop every cookie write, like a browser with cookies blocked.
    pub fn rejecting_all_cookies(mut self) -> Self {
        self.cookies_enabled = false;
        self
    }

    pub fn with_persistent_unavailable(mut self) -> Self {
        self.persistent_available = false;
        self
    }

    /// Remove a host function entirely.
    pub fn without(mut self, capability: StorageCapability) -> Self {
        self.capabilities.retain(|c| *c != capability);
        self
    }

    /// Make every call of `capability` fail until [`Self::recover`].
    pub fn fail(&self, capability: StorageCapability) {
        self.failing.lock().insert(capability);
    }

    pub fn recover(&self, capability: StorageCapability) {
        self.failing.lock().remove(&capability);
    }

    /// Seed a cookie without going through `set_cookie`.
    pub fn insert_cookie(&self, key: &str, value: &str) {
        self.cookies.lock().insert(
            key.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires: None,
                domain: None,
                same_site: SameSite::Lax,
            },
        );
    }

    pub fn insert_persistent(&self, key: &str, value: &str) {
        self.persistent
            .lock()
            .insert(key.to_string(), value.to_string());
    }

    /// Stored cookie, ignoring expiry.
    pub fn raw_cookie(&self, key: &str) -> Option<StoredCookie> {
        self.cookies.lock().get(key).cloned()
    }

    pub fn raw_persistent(&self, key: &str) -> Option<String> {
        self.persistent.lock().get(key).cloned()
    }

    /// Every `(key, domain)` passed to `set_cookie`, accepted or not.
    pub fn cookie_writes(&self) -> Vec<(String, Option<String>)> {
        self.cookie_writes.lock().clone()
    }

    fn check(&self, capability: StorageCapability) -> Result<(), StorageError> {
        if !self.capabilities.contains(&capability) {
            return Err(StorageError::Unsupported(capability));
        }
        if self.failing.lock().contains(&capability) {
            return Err(StorageError::Operation {
                operation: capability,
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn accepts_domain(&self, domain: Option<&str>) -> bool {
        match (domain, &self.accepted_domains) {
            (None, _) | (Some(_), None) => true,
            (Some(d), Some(accepted)) => {
                accepted.contains(&d.trim_start_matches('.').to_ascii_lowercase())
            }
        }
    }
}

impl ExternalStorage for InMemoryStorage {
    fn capabilities(&self) -> Vec<StorageCapability> {
        self.capabilities.clone()
    }

    fn get_cookie(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check(StorageCapability::GetCookie)?;
        let now = self.clock.now();
        let mut cookies = self.cookies.lock();
        let expired = cookies
            .get(key)
            .and_then(|c| c.expires)
            .is_some_and(|at| at <= now);
        if expired {
            cookies.remove(key);
            return Ok(None);
        }
        Ok(cookies.get(key).map(|c| c.value.clone()))
    }

    fn set_cookie(
        &self,
        key: &str,
        value: &str,
        expires: Option<DateTime<Utc>>,
        same_site: SameSite,
        domain: Option<&str>,
    ) -> Result<(), StorageError> {
        self.check(StorageCapability::SetCookie)?;
        self.cookie_writes
            .lock()
            .push((key.to_string(), domain.map(str::to_string)));

        if !self.cookies_enabled || !self.accepts_domain(domain) {
            return Ok(());
        }
        if expires.is_some_and(|at| at <= self.clock.now()) {
            self.cookies.lock().remove(key);
            return Ok(());
        }
        self.cookies.lock().insert(
            key.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires,
                domain: domain.map(str::to_string),
                same_site,
            },
        );
        Ok(())
    }

    fn get_from_persistent(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check(StorageCapability::GetFromPersistent)?;
        Ok(self.persistent.lock().get(key).cloned())
    }

    fn set_in_persistent(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(StorageCapability::SetInPersistent)?;
        self.insert_persistent(key, value);
        Ok(())
    }

    fn remove_persistent(&self, key: &str) -> Result<(), StorageError> {
        self.check(StorageCapability::RemovePersistent)?;
        self.persistent.lock().remove(key);
        Ok(())
    }

    fn find_keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.check(StorageCapability::FindKeysWithPrefix)?;
        Ok(self
            .persistent
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn persistent_storage_available(&self) -> Result<bool, StorageError> {
        self.check(StorageCapability::PersistentStorageAvailable)?;
        Ok(self.persistent_available)
    }
}
