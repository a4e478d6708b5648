//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - The cache record shape
//! - Expiry marker naming and encoding
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod record;

pub use record::{decode_expiry, encode_expiry, expiry_key, CacheRecord, EXPIRY_SUFFIX};
