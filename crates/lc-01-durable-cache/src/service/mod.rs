//! Service Layer
//!
//! The three storage strategies and the factory that picks one.

pub mod cookie_cache;
pub mod factory;
pub mod noop_cache;
pub mod persistent_cache;

pub use cookie_cache::CookieCache;
pub use factory::{make_cache, CacheOptions, StorageBackedCache};
pub use noop_cache::NoOpCache;
pub use persistent_cache::PersistentCache;
