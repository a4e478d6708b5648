//! Cookie-backed cache.
//!
//! Each record is a single cookie `key`. Its expiry is the cookie's own
//! expiry attribute, so the jar drops elapsed records (and a write with a past
//! expiry deletes the cookie) and there is nothing to repair on read. Cookies are scoped to the cache's domain, so a value
//! written on one subdomain is visible on its siblings.
//!
//! The jar does not expose a cookie's expiry, so records read back carry
//! `expires_at: None`.

use chrono::{DateTime, Utc};
use shared_types::SameSite;
use std::sync::Arc;

use crate::domain::CacheRecord;
use crate::handler::StorageHandler;
use crate::ports::DurableCache;

pub struct CookieCache {
    handler: Arc<StorageHandler>,
    domain: Option<String>,
}

impl CookieCache {
    pub fn new(handler: Arc<StorageHandler>, domain: Option<String>) -> Self {
        Self { handler, domain }
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}

impl DurableCache for CookieCache {
    fn get(&self, key: &str) -> Option<CacheRecord> {
        self.handler
            .get_cookie(key)
            .filter(|data| !data.is_empty())
            .map(|data| CacheRecord::new(data, None))
    }

    fn set(&self, key: &str, value: &str, expires_at: Option<DateTime<Utc>>) {
        self.handler
            .set_cookie(key, value, expires_at, SameSite::Lax, self.domain.as_deref());
    }
}
