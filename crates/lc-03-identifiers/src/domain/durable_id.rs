//! Durable identifier format.
//!
//! `<domain hash>--<uuid v7>`, lower-cased. The hash prefix is stable for an
//! apex domain, so identifiers issued for the same site share it; the
//! UUID v7 suffix is unique and sorts by creation time.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hex characters of the domain hash kept in the identifier.
pub const DOMAIN_HASH_LENGTH: usize = 12;

/// Stable prefix for `apex_domain` (leading dot ignored).
pub fn domain_hash(apex_domain: &str) -> String {
    let digest = Sha256::digest(apex_domain.trim_start_matches('.').as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(DOMAIN_HASH_LENGTH);
    hash
}

/// Fresh durable identifier for `apex_domain`.
pub fn generate_durable_id(apex_domain: &str) -> String {
    format!("{}--{}", domain_hash(apex_domain), Uuid::now_v7().simple()).to_lowercase()
}
