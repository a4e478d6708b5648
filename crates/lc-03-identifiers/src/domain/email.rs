//! E-mail detection and hashing.
//!
//! Scraped values may contain e-mail addresses; they leave this crate only
//! as SHA-256 hex digests of the trimmed, lower-cased address.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

// Literal pattern, compiled by the tests below.
#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}")
        .expect("e-mail pattern is a valid regex")
});

/// Result of scrubbing a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmailScrubbed {
    /// Input with every address replaced by its hash.
    pub value: String,
    /// Hashes of the replaced addresses, in order of appearance, deduplicated.
    pub hashes: Vec<String>,
}

/// SHA-256 hex of the normalized address.
pub fn hash_email(email: &str) -> String {
    hex::encode(Sha256::digest(email.trim().to_lowercase().as_bytes()))
}

/// Replace every e-mail address in `value` with its hash.
pub fn replace_emails_with_hashes(value: &str) -> EmailScrubbed {
    let mut hashes: Vec<String> = Vec::new();
    let scrubbed = EMAIL.replace_all(value, |caps: &regex::Captures<'_>| {
        let hash = hash_email(&caps[0]);
        if !hashes.contains(&hash) {
            hashes.push(hash.clone());
        }
        hash
    });
    EmailScrubbed {
        value: scrubbed.into_owned(),
        hashes,
    }
}
