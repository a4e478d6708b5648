//! A complete tag instance over test doubles.

use std::sync::{Arc, OnceLock};

use lc_01_durable_cache::{make_cache, CacheOptions, StorageBackedCache, StorageHandler};
use lc_02_apex_domain::ApexDomainResolver;
use lc_03_identifiers::{FirstPartyIdentifier, IdentifierScraper, ScrapedIdentifiers};
use lc_04_identity_resolver::testing::RecordingTransport;
use lc_04_identity_resolver::{
    ConfigError, IdentityResolutionConfig, IdentityResolver, VisitorState,
};
use lc_telemetry::{init_telemetry, TelemetryConfig, TelemetryGuard};
use shared_bus::{init_bus_in, ReplayBus, DEFAULT_REPLAY_SIZE};
use shared_types::testing::InMemoryStorage;
use shared_types::{MockTimeSource, StorageStrategy};

static TELEMETRY: OnceLock<Option<TelemetryGuard>> = OnceLock::new();

/// Install logging once per test binary; `LC_LOG_LEVEL` controls verbosity.
pub fn init_test_logging() {
    TELEMETRY.get_or_init(|| {
        let config = TelemetryConfig {
            log_level: std::env::var("LC_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
            ..TelemetryConfig::for_component("tests")
        };
        init_telemetry(config).ok()
    });
}

/// How the embedding page configured the tag.
#[derive(Debug, Clone)]
pub struct TagOptions {
    /// Registry slot; each test uses its own so buses do not leak between tests.
    pub slot: String,
    pub host: String,
    pub strategy: StorageStrategy,
    pub privacy_mode: bool,
    pub identifiers_to_scrape: Vec<String>,
    pub resolution: IdentityResolutionConfig,
}

impl TagOptions {
    pub fn new(slot: &str, host: &str) -> Self {
        Self {
            slot: slot.to_string(),
            host: host.to_string(),
            strategy: StorageStrategy::Cookie,
            privacy_mode: false,
            identifiers_to_scrape: Vec::new(),
            resolution: IdentityResolutionConfig::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: StorageStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_privacy_mode(mut self) -> Self {
        self.privacy_mode = true;
        self
    }

    pub fn scraping(mut self, names: &[&str]) -> Self {
        self.identifiers_to_scrape = names.iter().map(|n| n.to_string()).collect();
        self
    }
}

/// Everything one tag instance owns after start-up.
pub struct TagInstance {
    pub bus: Arc<ReplayBus>,
    pub handler: Arc<StorageHandler>,
    pub apex: ApexDomainResolver,
    pub cache: Arc<StorageBackedCache>,
    pub durable_id: String,
    pub scraped: ScrapedIdentifiers,
    pub resolver: IdentityResolver,
}

impl TagInstance {
    pub fn start(
        options: TagOptions,
        storage: Arc<InMemoryStorage>,
        transport: Arc<RecordingTransport>,
        clock: Arc<MockTimeSource>,
    ) -> Result<Self, ConfigError> {
        init_test_logging();

        let bus = init_bus_in(&options.slot, DEFAULT_REPLAY_SIZE);
        let strategy = options.strategy.effective(options.privacy_mode);
        let handler = Arc::new(StorageHandler::new(strategy, storage, bus.clone()));

        let apex = ApexDomainResolver::new(handler.clone(), options.host.as_str());
        let apex_domain = apex.apex_domain().to_string();

        let cache = Arc::new(make_cache(
            handler.clone(),
            CacheOptions::default()
                .with_domain(apex_domain.as_str())
                .with_clock(clock.clone()),
        ));

        let durable_id = FirstPartyIdentifier::new(cache.clone(), apex_domain)
            .with_clock(clock.clone())
            .resolve()
            .to_string();

        let scraped =
            IdentifierScraper::new(handler.clone()).scrape(options.identifiers_to_scrape.as_slice());

        let visitor = VisitorState::default()
            .with_durable_id(durable_id.as_str())
            .with_privacy_mode(options.privacy_mode)
            .with_identifiers(scraped.identifiers.clone());

        let resolver =
            IdentityResolver::builder(options.resolution, transport, cache.clone(), bus.clone())
                .visitor(visitor)
                .clock(clock)
                .build()?;

        Ok(Self {
            bus,
            handler,
            apex,
            cache,
            durable_id,
            scraped,
            resolver,
        })
    }
}
