//! Cache record and expiry marker encoding.

use chrono::{DateTime, Utc};

/// Suffix of the sibling persistent record holding a key's expiry.
pub const EXPIRY_SUFFIX: &str = "_exp";

/// A cached value with its optional expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub data: String,
    /// `None` for records written without an expiry, legacy values that
    /// predate expiry markers, and cookie records (the jar keeps their
    /// expiry out of reach).
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheRecord {
    pub fn new(data: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            data: data.into(),
            expires_at,
        }
    }

    /// Whether the record has expired at `now`. Expiry is inclusive.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Name of the expiry marker paired with `key`.
pub fn expiry_key(key: &str) -> String {
    format!("{key}{EXPIRY_SUFFIX}")
}

/// Serialize an expiry marker (RFC 2822, the format HTTP dates also use).
pub fn encode_expiry(at: DateTime<Utc>) -> String {
    at.to_rfc2822()
}

/// Parse an expiry marker. Accepts RFC 2822 / HTTP-date and RFC 3339.
pub fn decode_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|at| at.with_timezone(&Utc))
}
