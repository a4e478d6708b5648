//! Ports Layer - hexagonal boundaries.

pub mod inbound;
pub mod outbound;

pub use inbound::{IdentityResolutionApi, OnError, OnSuccess};
pub use outbound::{ResponseMeta, Transport, TransportFailure, TransportSuccess};
