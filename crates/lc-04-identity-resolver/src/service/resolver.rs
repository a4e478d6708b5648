//! Identity resolution service.
//!
//! ## Per-key state
//!
//! ```text
//!              cache hit
//! Uncalled ─────────────────────────────► Resolved
//!     │
//!     │ transport.get                 ┌──► Resolved (response cached,
//!     └────────────► Pending ─────────┤     malformed body cached as {})
//!                     ▲    │          └──► Failed (nothing cached)
//!     same key ───────┘    │
//!     (queued, no call)    ▼
//!                     every queued callback runs once
//! ```
//!
//! A transport that drops both callbacks without calling either fails the
//! request with [`TransportError::Dropped`], so a key never stays pending.
//! There is no internal retry: a failed key goes back to the network on the
//! next call.

use lc_01_durable_cache::DurableCache;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use shared_bus::ReplayBus;
use shared_types::{SystemTimeSource, TimeSource};
use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::domain::request::params_object;
use crate::domain::{
    cache_key, compose_url, parse_body, response_expiry, IdentityResolutionConfig,
    ResolvedAttributes, VisitorState,
};
use crate::error::{ConfigError, ResolutionError, TransportError};
use crate::metrics::ResolverMetrics;
use crate::ports::{IdentityResolutionApi, OnError, OnSuccess, ResponseMeta, Transport};

/// Error-event name for transport and composition failures.
pub const IDENTITY_RESOLVER_ERROR: &str = "IdentityResolver";

/// Error-event name for malformed response bodies.
pub const IDENTITY_RESOLVER_PARSER_ERROR: &str = "IdentityResolverParser";

struct Waiter {
    on_success: OnSuccess,
    on_error: OnError,
}

/// Callers waiting on one network request.
struct InFlight {
    request: u64,
    waiters: Vec<Waiter>,
}

/// Shared by a request's transport callbacks; fails the request if both are
/// dropped while it is still pending.
struct RequestGuard {
    shared: Arc<Shared>,
    key: String,
    request: u64,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.shared.fail(&self.key, self.request, TransportError::Dropped);
    }
}

/// State reachable from transport callbacks.
struct Shared {
    config: IdentityResolutionConfig,
    visitor: VisitorState,
    cache: Arc<dyn DurableCache>,
    bus: Arc<ReplayBus>,
    clock: Arc<dyn TimeSource>,
    metrics: ResolverMetrics,
    pending: Mutex<HashMap<String, InFlight>>,
    next_request: AtomicU64,
}

impl Shared {
    fn cached(&self, key: &str) -> Option<ResolvedAttributes> {
        let record = self.cache.get(key)?;
        match parse_body(&record.data) {
            Ok(attributes) => Some(attributes),
            Err(e) => {
                debug!(key = %key, error = %e, "Ignoring unreadable cached resolution");
                None
            }
        }
    }

    fn complete(&self, key: &str, request: u64, body: &str, meta: &ResponseMeta) {
        let attributes = parse_body(body).unwrap_or_else(|e| {
            self.metrics.record_parse_error();
            self.report(IDENTITY_RESOLVER_PARSER_ERROR, &e);
            Map::new()
        });
        let expires = response_expiry(
            meta.header("expires"),
            self.clock.now(),
            self.config.expiration_hours,
        );
        self.cache
            .set(key, &Value::Object(attributes.clone()).to_string(), Some(expires));
        debug!(key = %key, attributes = attributes.len(), "Identity resolved");

        let Some(waiters) = self.take_waiters(key, request) else {
            return;
        };
        for waiter in waiters {
            (waiter.on_success)(attributes.clone());
        }
    }

    fn fail(&self, key: &str, request: u64, error: TransportError) {
        let Some(waiters) = self.take_waiters(key, request) else {
            return;
        };

        let error = ResolutionError::from(error);
        self.report(IDENTITY_RESOLVER_ERROR, &error);
        self.metrics.record_failures(waiters.len());
        for waiter in waiters {
            (waiter.on_error)(error.clone());
        }
    }

    /// Waiters of `request`, if it is still the one pending for `key`.
    fn take_waiters(&self, key: &str, request: u64) -> Option<Vec<Waiter>> {
        let mut pending = self.pending.lock();
        match pending.get(key) {
            Some(in_flight) if in_flight.request == request => {
                pending.remove(key).map(|in_flight| in_flight.waiters)
            }
            _ => None,
        }
    }

    fn report(&self, name: &str, error: &(dyn Error + 'static)) {
        warn!(name = %name, error = %error, "Identity resolution error");
        self.bus.emit_error(name, error);
    }
}

/// Resolves visitor identity attributes, caching each distinct parameter
/// set and sharing one network call between concurrent identical requests.
pub struct IdentityResolver {
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
}

impl IdentityResolver {
    pub fn builder(
        config: IdentityResolutionConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn DurableCache>,
        bus: Arc<ReplayBus>,
    ) -> IdentityResolverBuilder {
        IdentityResolverBuilder {
            config,
            visitor: VisitorState::default(),
            transport,
            cache,
            bus,
            clock: Arc::new(SystemTimeSource),
        }
    }

    pub fn config(&self) -> &IdentityResolutionConfig {
        &self.shared.config
    }

    pub fn visitor(&self) -> &VisitorState {
        &self.shared.visitor
    }

    pub fn metrics(&self) -> &ResolverMetrics {
        &self.shared.metrics
    }

    /// [`IdentityResolutionApi::resolve`] as a future.
    pub async fn resolve_async(
        &self,
        additional_params: &Value,
    ) -> Result<ResolvedAttributes, ResolutionError> {
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let tx_err = Arc::clone(&tx);

        self.resolve(
            Box::new(move |attributes| {
                if let Some(tx) = tx.lock().take() {
                    let _ = tx.send(Ok(attributes));
                }
            }),
            Box::new(move |error| {
                if let Some(tx) = tx_err.lock().take() {
                    let _ = tx.send(Err(error));
                }
            }),
            additional_params,
        );

        rx.await.unwrap_or(Err(ResolutionError::Cancelled))
    }
}

impl IdentityResolutionApi for IdentityResolver {
    fn resolve(&self, on_success: OnSuccess, on_error: OnError, additional_params: &Value) {
        let shared = &self.shared;
        shared.metrics.record_request();

        let params = match params_object(additional_params) {
            Ok(params) => params,
            Err(e) => {
                shared.report(IDENTITY_RESOLVER_ERROR, &e);
                shared.metrics.record_failures(1);
                on_error(e);
                return;
            }
        };
        let key = cache_key(additional_params);

        if let Some(attributes) = shared.cached(&key) {
            shared.metrics.record_cache_hit();
            debug!(key = %key, "Identity resolution served from cache");
            on_success(attributes);
            return;
        }

        let request = {
            let mut pending = shared.pending.lock();
            let waiter = Waiter {
                on_success,
                on_error,
            };
            if let Some(in_flight) = pending.get_mut(&key) {
                in_flight.waiters.push(waiter);
                shared.metrics.record_coalesced();
                debug!(
                    key = %key,
                    queued = in_flight.waiters.len(),
                    "Joined in-flight resolution"
                );
                return;
            }
            let request = shared.next_request.fetch_add(1, Ordering::Relaxed);
            pending.insert(
                key.clone(),
                InFlight {
                    request,
                    waiters: vec![waiter],
                },
            );
            request
        };

        let url = compose_url(&shared.config, &shared.visitor, &params);
        shared.metrics.record_network_call();
        debug!(url = %url, key = %key, request, "Requesting identity resolution");

        let guard = Arc::new(RequestGuard {
            shared: Arc::clone(shared),
            key,
            request,
        });
        let on_response = {
            let guard = Arc::clone(&guard);
            Box::new(move |body: String, meta: ResponseMeta| {
                guard.shared.complete(&guard.key, guard.request, &body, &meta)
            })
        };
        let on_failure = Box::new(move |error: TransportError| {
            guard.shared.fail(&guard.key, guard.request, error)
        });

        self.transport.get(
            &url,
            Duration::from_millis(shared.config.timeout_ms),
            on_response,
            on_failure,
        );
    }

    fn get_url(&self, additional_params: &Value) -> String {
        let params = params_object(additional_params).unwrap_or_default();
        compose_url(&self.shared.config, &self.shared.visitor, &params)
    }
}

pub struct IdentityResolverBuilder {
    config: IdentityResolutionConfig,
    visitor: VisitorState,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn DurableCache>,
    bus: Arc<ReplayBus>,
    clock: Arc<dyn TimeSource>,
}

impl IdentityResolverBuilder {
    pub fn visitor(mut self, visitor: VisitorState) -> Self {
        self.visitor = visitor;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<IdentityResolver, ConfigError> {
        self.config.validate()?;
        debug!(
            url = %self.config.url,
            expiration_hours = self.config.expiration_hours,
            "Identity resolver created"
        );
        Ok(IdentityResolver {
            shared: Arc::new(Shared {
                config: self.config,
                visitor: self.visitor,
                cache: self.cache,
                bus: self.bus,
                clock: self.clock,
                metrics: ResolverMetrics::new(),
                pending: Mutex::new(HashMap::new()),
                next_request: AtomicU64::new(0),
            }),
            transport: self.transport,
        })
    }
}
