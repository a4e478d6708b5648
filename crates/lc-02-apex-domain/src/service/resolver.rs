//! Apex-domain probe.
//!
//! ## Algorithm
//!
//! 1. A non-empty `_li_dcdm_c` cookie is returned verbatim.
//! 2. Otherwise, for each candidate suffix from most general to most
//!    specific, write `_li_dcdm_c=<candidate>` with `Domain=<candidate>` and
//!    read it back. The first candidate that round-trips wins; its cookie
//!    doubles as the session cache record.
//! 3. If none round-trips, the full host is used.
//!
//! Browsers refuse `Domain` attributes naming a public suffix, so the
//! shortest accepted candidate is the registrable domain.

use lc_01_durable_cache::StorageHandler;
use shared_types::SameSite;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::domain::{candidate_suffixes, host_fallback};

/// Session cookie caching the discovered apex domain.
pub const APEX_DOMAIN_CACHE_KEY: &str = "_li_dcdm_c";

/// Broadest domain suffix on which a cookie round-trips for `host`.
///
/// Never fails: storage errors count as a failed candidate (and are
/// reported by the handler).
pub fn resolve_apex_domain(handler: &StorageHandler, host: &str) -> String {
    if let Some(cached) = handler
        .get_cookie(APEX_DOMAIN_CACHE_KEY)
        .filter(|v| !v.is_empty())
    {
        return cached;
    }

    for candidate in candidate_suffixes(host) {
        handler.set_cookie(
            APEX_DOMAIN_CACHE_KEY,
            &candidate,
            None,
            SameSite::Lax,
            Some(&candidate),
        );
        let accepted = handler
            .get_cookie(APEX_DOMAIN_CACHE_KEY)
            .is_some_and(|v| !v.is_empty());
        if accepted {
            debug!(host = %host, apex = %candidate, "Apex domain discovered");
            return candidate;
        }
    }

    let fallback = host_fallback(host);
    debug!(host = %host, apex = %fallback, "No suffix accepted, using full host");
    fallback
}

/// Per-page resolver that probes at most once.
pub struct ApexDomainResolver {
    handler: Arc<StorageHandler>,
    host: String,
    resolved: OnceLock<String>,
}

impl ApexDomainResolver {
    pub fn new(handler: Arc<StorageHandler>, host: impl Into<String>) -> Self {
        Self {
            handler,
            host: host.into(),
            resolved: OnceLock::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The apex domain, probing on first call only.
    pub fn apex_domain(&self) -> &str {
        self.resolved
            .get_or_init(|| resolve_apex_domain(&self.handler, &self.host))
    }
}
