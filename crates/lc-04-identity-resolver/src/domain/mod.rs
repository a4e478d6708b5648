//! Domain Layer - pure resolution logic (no I/O).

pub mod cache_key;
pub mod config;
pub mod request;
pub mod response;
pub mod visitor;

pub use cache_key::{cache_key, canonical_json, CACHE_KEY_PREFIX};
pub use config::IdentityResolutionConfig;
pub use request::{compose_url, query_pairs, PRIVACY_MODE_BLOCKED_ATTRIBUTES};
pub use response::{parse_body, response_expiry, ResolvedAttributes};
pub use visitor::VisitorState;
