//! Inbound Ports (Driving Ports)

use chrono::{DateTime, Utc};

use crate::domain::CacheRecord;

/// Uniform get/set contract over a storage strategy.
///
/// Neither operation fails: storage errors are reported on the bus and the
/// operation degrades to "absent" / "discarded".
pub trait DurableCache: Send + Sync {
    /// Read `key`. An expired record reads as `None`.
    fn get(&self, key: &str) -> Option<CacheRecord>;

    /// Write `key`, replacing any previous value and expiry.
    fn set(&self, key: &str, value: &str, expires_at: Option<DateTime<Utc>>);
}
