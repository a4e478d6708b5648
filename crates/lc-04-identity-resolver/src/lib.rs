//! # LC-04 Identity Resolver
//!
//! Asks the identity resolution endpoint which identity attributes belong
//! to the current visitor, caching each distinct request in durable
//! storage.
//!
//! ## Architecture
//!
//! ```text
//!  tag ──► IdentityResolutionApi ──► IdentityResolver ──► Transport ──► endpoint
//!                                       │        │
//!                                       ▼        ▼
//!                                DurableCache  ReplayBus (error events)
//! ```
//!
//! - **Domain Layer** (`domain/`): config, visitor state, query composition,
//!   cache keys, response parsing
//! - **Ports Layer** (`ports/`): `IdentityResolutionApi` (driving),
//!   `Transport` (driven)
//! - **Service Layer** (`service/`): `IdentityResolver`
//! - **Adapters Layer** (`adapters/`): `TokioTransport` over an async client
//!
//! ## Guarantees
//!
//! - Identical additional params (in any key order) share a cache entry and
//!   at most one network call at a time.
//! - A malformed body resolves to `{}` and reports an
//!   `IdentityResolverParser` error event.
//! - Exactly one callback runs per `resolve` call.
//!
//! ## Usage Example
//!
//! ```ignore
//! let resolver = IdentityResolver::builder(config, transport, cache, bus)
//!     .visitor(VisitorState::default().with_durable_id(fpi.resolve()))
//!     .build()?;
//! let attributes = resolver.resolve_async(&json!({ "qf": "0.1" })).await?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports for convenience
pub use adapters::{HttpGet, HttpResponse, TokioTransport};
pub use domain::{
    cache_key, IdentityResolutionConfig, ResolvedAttributes, VisitorState, CACHE_KEY_PREFIX,
};
pub use error::{ConfigError, ResolutionError, TransportError};
pub use metrics::{MetricsSnapshot, ResolverMetrics};
pub use ports::{IdentityResolutionApi, OnError, OnSuccess, ResponseMeta, Transport};
pub use service::{
    IdentityResolver, IdentityResolverBuilder, IDENTITY_RESOLVER_ERROR,
    IDENTITY_RESOLVER_PARSER_ERROR,
};
