//! Counters for identity resolution.
//!
//! ## Usage
//!
//! ```ignore
//! let snapshot = resolver.metrics().snapshot();
//! assert_eq!(snapshot.network_calls, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe resolution counters.
#[derive(Debug, Default)]
pub struct ResolverMetrics {
    /// `resolve` calls
    pub requests: AtomicU64,
    /// Requests answered from the cache
    pub cache_hits: AtomicU64,
    /// Requests attached to an in-flight call
    pub coalesced: AtomicU64,
    /// Calls handed to the transport
    pub network_calls: AtomicU64,
    /// Requests completed through `on_error`
    pub failures: AtomicU64,
    /// Response bodies that were not a JSON object
    pub parse_errors: AtomicU64,
}

impl ResolverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_network_call(&self) {
        self.network_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `count` waiters failed by one outcome.
    pub fn record_failures(&self, count: usize) {
        self.failures.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            network_calls: self.network_calls.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ResolverMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub cache_hits: u64,
    pub coalesced: u64,
    pub network_calls: u64,
    pub failures: u64,
    pub parse_errors: u64,
}

impl MetricsSnapshot {
    /// Share of requests that did not reach the network.
    pub fn hit_ratio(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        (self.cache_hits + self.coalesced) as f64 / self.requests as f64
    }
}
