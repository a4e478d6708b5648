//! First-party durable identifier.
//!
//! ## Lifecycle
//!
//! ```text
//! resolve() ──► memo? ──yes──► value
//!                 │no
//!                 ▼
//!          cache.get(_lc2_fpi) ──hit──► adopt ──┐
//!                 │miss                        │
//!                 ▼                            ▼
//!          generate_durable_id ──────► cache.set(value, now + expiration)
//!                                              │
//!                                              ▼
//!                                            memo
//! ```
//!
//! The value is never regenerated while a record exists. Records written
//! without expiry metadata are adopted as-is and get one on the next write.
//! When storage keeps nothing, the memo still gives one stable value per
//! instance.

use chrono::Duration;
use lc_01_durable_cache::DurableCache;
use shared_types::{SystemTimeSource, TimeSource};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::domain::generate_durable_id;

/// Cache key of the durable identifier.
pub const DURABLE_ID_KEY: &str = "_lc2_fpi";

/// Lifetime granted on every read or write.
pub const DEFAULT_EXPIRATION_DAYS: i64 = 730;

pub struct FirstPartyIdentifier {
    cache: Arc<dyn DurableCache>,
    apex_domain: String,
    clock: Arc<dyn TimeSource>,
    expiration: Duration,
    resolved: OnceLock<String>,
}

impl FirstPartyIdentifier {
    pub fn new(cache: Arc<dyn DurableCache>, apex_domain: impl Into<String>) -> Self {
        Self {
            cache,
            apex_domain: apex_domain.into(),
            clock: Arc::new(SystemTimeSource),
            expiration: Duration::days(DEFAULT_EXPIRATION_DAYS),
            resolved: OnceLock::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_expiration_days(mut self, days: i64) -> Self {
        self.expiration = Duration::days(days);
        self
    }

    pub fn apex_domain(&self) -> &str {
        &self.apex_domain
    }

    /// The visitor's durable identifier, created on first use.
    pub fn resolve(&self) -> &str {
        self.resolved.get_or_init(|| self.load_or_create())
    }

    fn load_or_create(&self) -> String {
        let value = match self.cache.get(DURABLE_ID_KEY) {
            Some(record) => {
                debug!(expires_at = ?record.expires_at, "Durable identifier found");
                record.data
            }
            None => {
                let value = generate_durable_id(&self.apex_domain);
                debug!(apex_domain = %self.apex_domain, "Durable identifier created");
                value
            }
        };

        let expires = self.clock.now() + self.expiration;
        self.cache.set(DURABLE_ID_KEY, &value, Some(expires));
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::domain_hash;
    use lc_01_durable_cache::{make_cache, CacheOptions, StorageHandler};
    use shared_bus::ReplayBus;
    use shared_types::testing::InMemoryStorage;
    use shared_types::{MockTimeSource, StorageStrategy};

    struct Fixture {
        storage: Arc<InMemoryStorage>,
        clock: Arc<MockTimeSource>,
        handler: Arc<StorageHandler>,
    }

    impl Fixture {
        fn new(strategy: StorageStrategy) -> Self {
            let clock = Arc::new(MockTimeSource::starting_now());
            let storage = Arc::new(InMemoryStorage::new().with_clock(clock.clone()));
            let bus = Arc::new(ReplayBus::new(5));
            let handler = Arc::new(StorageHandler::new(strategy, storage.clone(), bus));
            Self {
                storage,
                clock,
                handler,
            }
        }

        fn identifier(&self) -> FirstPartyIdentifier {
            let options = CacheOptions::default()
                .with_domain(".example.com")
                .with_clock(self.clock.clone());
            let cache = make_cache(self.handler.clone(), options);
            FirstPartyIdentifier::new(Arc::new(cache), ".example.com")
                .with_clock(self.clock.clone())
        }
    }

    #[test]
    fn test_created_once_and_reused() {
        let fx = Fixture::new(StorageStrategy::Cookie);
        let first = fx.identifier().resolve().to_string();
        let second = fx.identifier().resolve().to_string();

        assert_eq!(first, second);
        assert!(first.starts_with(&format!("{}--", domain_hash(".example.com"))));
        assert_eq!(
            fx.storage.raw_cookie(DURABLE_ID_KEY).unwrap().value,
            first
        );
    }

    #[test]
    fn test_read_refreshes_expiry_without_changing_value() {
        let fx = Fixture::new(StorageStrategy::Cookie);
        let value = fx.identifier().resolve().to_string();
        let initial = fx.storage.raw_cookie(DURABLE_ID_KEY).unwrap().expires.unwrap();

        fx.clock.advance(Duration::days(700));
        assert_eq!(fx.identifier().resolve(), value);

        let refreshed = fx.storage.raw_cookie(DURABLE_ID_KEY).unwrap().expires.unwrap();
        assert_eq!(refreshed - initial, Duration::days(700));
    }

    #[test]
    fn test_expired_identifier_is_regenerated() {
        let fx = Fixture::new(StorageStrategy::Cookie);
        let value = fx.identifier().resolve().to_string();

        fx.clock.advance(Duration::days(DEFAULT_EXPIRATION_DAYS + 1));
        assert_ne!(fx.identifier().resolve(), value);
    }

    #[test]
    fn test_legacy_value_adopted() {
        let fx = Fixture::new(StorageStrategy::Cookie);
        fx.storage.insert_cookie(DURABLE_ID_KEY, "legacy-id");

        assert_eq!(fx.identifier().resolve(), "legacy-id");
        let cookie = fx.storage.raw_cookie(DURABLE_ID_KEY).unwrap();
        assert_eq!(
            cookie.expires,
            Some(fx.clock.now() + Duration::days(DEFAULT_EXPIRATION_DAYS))
        );
    }

    #[test]
    fn test_persistent_strategy() {
        let fx = Fixture::new(StorageStrategy::LocalStorage);
        let value = fx.identifier().resolve().to_string();

        assert_eq!(fx.storage.raw_persistent(DURABLE_ID_KEY).as_deref(), Some(value.as_str()));
        assert_eq!(fx.identifier().resolve(), value);
    }

    #[test]
    fn test_disabled_storage_is_stable_per_instance() {
        let fx = Fixture::new(StorageStrategy::Disabled);
        let identifier = fx.identifier();
        let first = identifier.resolve().to_string();

        assert_eq!(identifier.resolve(), first);
        assert_ne!(fx.identifier().resolve(), first);
        assert!(fx.storage.raw_cookie(DURABLE_ID_KEY).is_none());
    }
}
