//! # Identity Flows
//!
//! Start-up of a full tag instance (apex discovery, durable identifier,
//! scraping) followed by identity resolution.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::DateTime;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use lc_01_durable_cache::DurableCache;
    use lc_03_identifiers::{domain_hash, hash_email, DURABLE_ID_KEY};
    use lc_04_identity_resolver::testing::RecordingTransport;
    use lc_04_identity_resolver::{
        cache_key, HttpGet, HttpResponse, IdentityResolutionApi, IdentityResolutionConfig,
        IdentityResolver, ResolvedAttributes, TokioTransport, TransportError, VisitorState,
        IDENTITY_RESOLVER_PARSER_ERROR,
    };
    use shared_bus::{init_bus_in, ERROR_TOPIC};
    use shared_types::testing::InMemoryStorage;
    use shared_types::{ErrorDetails, MockTimeSource};

    use crate::harness::{TagInstance, TagOptions};

    fn clock() -> Arc<MockTimeSource> {
        Arc::new(MockTimeSource::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ))
    }

    /// A browser that refuses `Domain=.com`.
    fn browser_storage(clock: &Arc<MockTimeSource>) -> Arc<InMemoryStorage> {
        Arc::new(
            InMemoryStorage::new()
                .with_clock(clock.clone())
                .accepting_cookie_domains(&["example.com"]),
        )
    }

    fn start(
        options: TagOptions,
        storage: &Arc<InMemoryStorage>,
        transport: &Arc<RecordingTransport>,
        clock: &Arc<MockTimeSource>,
    ) -> TagInstance {
        TagInstance::start(options, storage.clone(), transport.clone(), clock.clone()).unwrap()
    }

    fn resolve(tag: &TagInstance, params: Value) -> Arc<Mutex<Vec<ResolvedAttributes>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        tag.resolver.resolve(
            Box::new(move |attributes| sink.lock().push(attributes)),
            Box::new(|error| panic!("unexpected resolution error: {error}")),
            &params,
        );
        seen
    }

    #[test]
    fn test_apex_domain_is_registrable_domain() {
        let clock = clock();
        let transport = Arc::new(RecordingTransport::responding("{}"));
        let tag = start(
            TagOptions::new("it_apex_registrable", "a.b.example.com"),
            &browser_storage(&clock),
            &transport,
            &clock,
        );
        assert_eq!(tag.apex.apex_domain(), ".example.com");
    }

    #[test]
    fn test_apex_domain_falls_back_to_host() {
        let clock = clock();
        let storage = Arc::new(
            InMemoryStorage::new()
                .with_clock(clock.clone())
                .accepting_cookie_domains(&[]),
        );
        let transport = Arc::new(RecordingTransport::responding("{}"));
        let tag = start(
            TagOptions::new("it_apex_fallback", "a.b.example.com"),
            &storage,
            &transport,
            &clock,
        );
        assert_eq!(tag.apex.apex_domain(), ".a.b.example.com");
    }

    #[test]
    fn test_durable_id_is_stable_across_page_views() {
        let clock = clock();
        let storage = browser_storage(&clock);
        let transport = Arc::new(RecordingTransport::responding("{}"));

        let first = start(
            TagOptions::new("it_durable_id_1", "www.example.com"),
            &storage,
            &transport,
            &clock,
        );
        let second = start(
            TagOptions::new("it_durable_id_2", "shop.example.com"),
            &storage,
            &transport,
            &clock,
        );

        assert_eq!(first.durable_id, second.durable_id);
        assert!(first
            .durable_id
            .starts_with(&format!("{}--", domain_hash(".example.com"))));
        assert_eq!(first.durable_id, first.durable_id.to_lowercase());

        let cookie = storage.raw_cookie(DURABLE_ID_KEY).unwrap();
        assert_eq!(cookie.domain.as_deref(), Some(".example.com"));
    }

    #[test]
    fn test_identical_params_share_one_call_distinct_params_cached_separately() {
        let clock = clock();
        let storage = browser_storage(&clock);
        let transport = Arc::new(RecordingTransport::responding(r#"{"nonId":"n1"}"#));
        let tag = start(
            TagOptions::new("it_param_caching", "example.com"),
            &storage,
            &transport,
            &clock,
        );

        resolve(&tag, json!({ "qf": "0.1", "resolve": ["uid2"] }));
        resolve(&tag, json!({ "resolve": ["uid2"], "qf": "0.1" }));
        assert_eq!(transport.call_count(), 1);

        transport.respond_with(r#"{"nonId":"n2"}"#);
        let second = resolve(&tag, json!({ "qf": "0.2" }));
        assert_eq!(transport.call_count(), 2);
        assert_eq!(second.lock()[0].get("nonId"), Some(&json!("n2")));

        let first_key = cache_key(&json!({ "qf": "0.1", "resolve": ["uid2"] }));
        let second_key = cache_key(&json!({ "qf": "0.2" }));
        assert_eq!(tag.cache.get(&first_key).unwrap().data, r#"{"nonId":"n1"}"#);
        assert_eq!(tag.cache.get(&second_key).unwrap().data, r#"{"nonId":"n2"}"#);
    }

    #[test]
    fn test_malformed_response_is_cached_as_empty_object() {
        let clock = clock();
        let storage = browser_storage(&clock);
        let transport = Arc::new(RecordingTransport::responding("<html>oops</html>"));
        let tag = start(
            TagOptions::new("it_malformed_response", "example.com"),
            &storage,
            &transport,
            &clock,
        );

        let seen = resolve(&tag, Value::Null);

        assert_eq!(seen.lock().as_slice(), &[ResolvedAttributes::new()]);
        let parser_errors = tag
            .bus
            .buffered(ERROR_TOPIC)
            .iter()
            .filter_map(|args| ErrorDetails::from_args(args))
            .filter(|details| details.name == IDENTITY_RESOLVER_PARSER_ERROR)
            .count();
        assert_eq!(parser_errors, 1);

        let again = resolve(&tag, Value::Null);
        assert_eq!(again.lock().as_slice(), &[ResolvedAttributes::new()]);
        assert_eq!(transport.call_count(), 1);
        assert_eq!(tag.cache.get(&cache_key(&Value::Null)).unwrap().data, "{}");
    }

    #[test]
    fn test_scraped_email_is_sent_hashed() {
        let clock = clock();
        let storage = browser_storage(&clock);
        storage.insert_cookie("cookie_to_scrape", "sample@liveintent.com");
        let transport = Arc::new(RecordingTransport::responding("{}"));

        let tag = start(
            TagOptions::new("it_scraped_email", "example.com").scraping(&["cookie_to_scrape"]),
            &storage,
            &transport,
            &clock,
        );
        resolve(&tag, Value::Null);

        let hash = hash_email("sample@liveintent.com");
        assert_eq!(tag.scraped.hashes, vec![hash.clone()]);

        let url = &transport.urls()[0];
        assert!(url.contains(&format!("cookie_to_scrape={hash}")));
        assert!(!url.contains("sample@liveintent.com"));
        assert!(!url.contains("sample%40liveintent.com"));
    }

    #[test]
    fn test_privacy_mode_request() {
        let clock = clock();
        let storage = browser_storage(&clock);
        let transport = Arc::new(RecordingTransport::responding("{}"));
        let mut options =
            TagOptions::new("it_privacy_mode_request", "example.com").with_privacy_mode();
        options.resolution = IdentityResolutionConfig::default()
            .with_requested_attributes(["nonId", "uid2"]);

        let tag = start(options, &storage, &transport, &clock);
        resolve(&tag, Value::Null);

        let url = &transport.urls()[0];
        assert!(url.contains("n3pc=1"));
        assert!(url.contains("resolve=nonId"));
        assert!(!url.contains("uid2"));
        assert!(url.contains(&format!("duid={}", tag.durable_id)));
    }

    struct EndpointStub {
        requests: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpGet for EndpointStub {
        async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            self.requests.lock().push(url.to_string());
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(HttpResponse {
                status: 200,
                headers: vec![(
                    "Expires".to_string(),
                    "Wed, 15 Nov 2023 06:00:00 GMT".to_string(),
                )],
                body: r#"{"unifiedId":"u-1"}"#.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_async_resolution_over_tokio_transport() {
        let clock = clock();
        let storage = browser_storage(&clock);
        let bus = init_bus_in("it_async_resolution", 5);
        let handler = Arc::new(lc_01_durable_cache::StorageHandler::new(
            shared_types::StorageStrategy::Cookie,
            storage.clone(),
            bus.clone(),
        ));
        let cache = Arc::new(lc_01_durable_cache::make_cache(
            handler,
            lc_01_durable_cache::CacheOptions::default().with_clock(clock.clone()),
        ));
        let transport = TokioTransport::current(EndpointStub {
            requests: Mutex::new(Vec::new()),
        })
        .unwrap();

        let resolver = IdentityResolver::builder(
            IdentityResolutionConfig::default().with_publisher_id("123"),
            Arc::new(transport),
            cache.clone(),
            bus,
        )
        .visitor(VisitorState::default().with_durable_id("abc--1"))
        .clock(clock)
        .build()
        .unwrap();

        let params = json!({ "qf": "0.1" });
        let (first, second) = tokio::join!(
            resolver.resolve_async(&params),
            resolver.resolve_async(&params)
        );

        assert_eq!(first.unwrap().get("unifiedId"), Some(&json!("u-1")));
        assert_eq!(second.unwrap().get("unifiedId"), Some(&json!("u-1")));
        assert_eq!(resolver.metrics().snapshot().network_calls, 1);
        let key = cache_key(&params);
        assert!(cache.get(&key).is_some());
        assert_eq!(
            storage.raw_cookie(&key).unwrap().expires,
            DateTime::from_timestamp(1_700_028_000, 0)
        );
    }
}
