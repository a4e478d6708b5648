//! # LC-02 Apex Domain
//!
//! Finds the most general domain suffix on which the browser accepts a
//! cookie for the current host, so an identifier written on one subdomain
//! is readable on its siblings.
//!
//! This is an empirical probe, not a public-suffix-list lookup.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): candidate suffix generation
//! - **Service Layer** (`service/`): `resolve_apex_domain`,
//!   `ApexDomainResolver` (memoizing wrapper)
//!
//! ## Usage Example
//!
//! ```ignore
//! let apex = resolve_apex_domain(&handler, "shop.example.com");
//! assert_eq!(apex, ".example.com");
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod service;

pub use domain::candidate_suffixes;
pub use service::{resolve_apex_domain, ApexDomainResolver, APEX_DOMAIN_CACHE_KEY};
