//! # LC-01 Durable Cache
//!
//! Storage-backed cache with expiry and repair-on-read, over browser
//! cookies, persistent storage, or nothing at all.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): `CacheRecord`, expiry marker encoding
//! - **Ports Layer** (`ports/`): `DurableCache` (driving port)
//! - **Handler Layer** (`handler/`): `StorageHandler`, the capability-checked
//!   wrapper over the host storage primitive
//! - **Service Layer** (`service/`): `CookieCache`, `PersistentCache`,
//!   `NoOpCache`, and `make_cache` which picks one
//!
//! ## Invariants
//!
//! - **Expired reads absent**: a record whose expiry is at or before now is
//!   never returned.
//! - **Repair-on-read**: an expired persistent record is deleted by the read
//!   that finds it.
//! - **Never fails**: storage errors are reported on the bus
//!   (`StorageHandler` error events) and degrade to absent / discarded.
//!
//! ## Usage Example
//!
//! ```ignore
//! let handler = Arc::new(StorageHandler::new(StorageStrategy::Cookie, storage, bus));
//! let cache = make_cache(handler, CacheOptions::default().with_domain(".example.com"));
//! cache.set("_lc2_fpi", "abc", Some(expires));
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod handler;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use domain::{expiry_key, CacheRecord};
pub use handler::{StorageHandler, STORAGE_HANDLER_ERROR};
pub use ports::DurableCache;
pub use service::{
    make_cache, CacheOptions, CookieCache, NoOpCache, PersistentCache, StorageBackedCache,
};
