//! # LC-03 Identifiers
//!
//! The visitor identifiers sent to identity resolution: the first-party
//! durable identifier owned by this tag, and identifiers scraped from
//! publisher cookies or storage.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): identifier format, e-mail hashing
//! - **Service Layer** (`service/`): `FirstPartyIdentifier`,
//!   `IdentifierScraper`
//!
//! ## Invariants
//!
//! - The durable identifier is never regenerated while its record exists.
//! - No raw e-mail address leaves the scraper.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod service;

pub use domain::{domain_hash, generate_durable_id, hash_email, replace_emails_with_hashes};
pub use service::{
    FirstPartyIdentifier, IdentifierScraper, ScrapedIdentifiers, DEFAULT_EXPIRATION_DAYS,
    DURABLE_ID_KEY,
};
