//! # Storage Degradation Flows
//!
//! The whole tag keeps working when the host storage is missing functions,
//! fails, or blocks writes.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration};

    use lc_01_durable_cache::{
        expiry_key, make_cache, CacheOptions, DurableCache, StorageHandler, STORAGE_HANDLER_ERROR,
    };
    use lc_04_identity_resolver::testing::RecordingTransport;
    use lc_04_identity_resolver::IdentityResolutionApi;
    use serde_json::Value;
    use shared_bus::{ReplayBus, ERROR_TOPIC};
    use shared_types::testing::InMemoryStorage;
    use shared_types::{ErrorDetails, MockTimeSource, StorageCapability, StorageStrategy, TimeSource};

    use crate::harness::{TagInstance, TagOptions};

    fn clock() -> Arc<MockTimeSource> {
        Arc::new(MockTimeSource::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ))
    }

    #[test]
    fn test_expired_persistent_entry_is_repaired_on_read() {
        let clock = clock();
        let storage = Arc::new(InMemoryStorage::new().with_clock(clock.clone()));
        let handler = Arc::new(StorageHandler::new(
            StorageStrategy::LocalStorage,
            storage.clone(),
            Arc::new(ReplayBus::default()),
        ));
        let cache = make_cache(handler, CacheOptions::default().with_clock(clock.clone()));

        cache.set("k", "v", Some(clock.now() + Duration::minutes(5)));
        clock.advance(Duration::minutes(6));

        assert!(cache.get("k").is_none());
        assert!(storage.raw_persistent("k").is_none());
        assert!(storage.raw_persistent(&expiry_key("k")).is_none());
    }

    #[test]
    fn test_tag_without_storage_still_resolves() {
        let storage = Arc::new(
            InMemoryStorage::new()
                .without(StorageCapability::GetCookie)
                .without(StorageCapability::SetCookie),
        );
        let transport = Arc::new(RecordingTransport::responding(r#"{"nonId":"n"}"#));
        let tag = TagInstance::start(
            TagOptions::new("it_tag_without_storage", "shop.example.com"),
            storage,
            transport.clone(),
            clock(),
        )
        .unwrap();

        assert_eq!(tag.apex.apex_domain(), ".shop.example.com");
        assert!(!tag.durable_id.is_empty());

        let errors: Vec<String> = tag
            .bus
            .buffered(ERROR_TOPIC)
            .iter()
            .filter_map(|args| ErrorDetails::from_args(args))
            .map(|details| details.name)
            .collect();
        assert_eq!(errors, vec![STORAGE_HANDLER_ERROR, STORAGE_HANDLER_ERROR]);

        // Nothing can be cached, so every call reaches the network.
        tag.resolver.resolve(Box::new(|_| {}), Box::new(|_| {}), &Value::Null);
        tag.resolver.resolve(Box::new(|_| {}), Box::new(|_| {}), &Value::Null);
        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn test_failing_cookie_writes_are_reported_not_raised() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.fail(StorageCapability::SetCookie);
        let transport = Arc::new(RecordingTransport::responding("{}"));

        let tag = TagInstance::start(
            TagOptions::new("it_failing_cookie_writes", "example.com"),
            storage.clone(),
            transport,
            clock(),
        )
        .unwrap();

        assert_eq!(tag.apex.apex_domain(), ".example.com");
        assert!(tag.durable_id.contains("--"));
        assert!(storage.raw_cookie("_lc2_fpi").is_none());
        assert!(!tag.bus.buffered(ERROR_TOPIC).is_empty());
    }

    #[test]
    fn test_unavailable_persistent_storage_falls_back_to_cookies() {
        let storage = Arc::new(InMemoryStorage::new().with_persistent_unavailable());
        let tag = TagInstance::start(
            TagOptions::new("it_unavailable_persistent", "example.com")
                .with_strategy(StorageStrategy::LocalStorage),
            storage.clone(),
            Arc::new(RecordingTransport::responding("{}")),
            clock(),
        )
        .unwrap();

        assert_eq!(tag.cache.strategy(), StorageStrategy::Cookie);
        assert_eq!(
            storage.raw_cookie("_lc2_fpi").map(|c| c.value),
            Some(tag.durable_id.clone())
        );
        assert!(storage.raw_persistent("_lc2_fpi").is_none());
    }

    #[test]
    fn test_privacy_mode_persists_nothing() {
        let storage = Arc::new(InMemoryStorage::new());
        let tag = TagInstance::start(
            TagOptions::new("it_privacy_mode_persists_nothing", "www.example.com")
                .with_privacy_mode(),
            storage.clone(),
            Arc::new(RecordingTransport::responding("{}")),
            clock(),
        )
        .unwrap();

        assert_eq!(tag.cache.strategy(), StorageStrategy::Disabled);
        assert!(storage.cookie_writes().is_empty());
        assert!(storage.raw_persistent("_lc2_fpi").is_none());
    }
}
