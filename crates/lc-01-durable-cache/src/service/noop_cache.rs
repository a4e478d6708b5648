//! Cache used when persistence is disabled.

use chrono::{DateTime, Utc};

use crate::domain::CacheRecord;
use crate::ports::DurableCache;

/// Reads nothing, writes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCache;

impl DurableCache for NoOpCache {
    fn get(&self, _key: &str) -> Option<CacheRecord> {
        None
    }

    fn set(&self, _key: &str, _value: &str, _expires_at: Option<DateTime<Utc>>) {}
}
