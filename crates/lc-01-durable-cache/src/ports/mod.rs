//! Ports Layer
//!
//! - Driving Port (inbound): [`DurableCache`], the get/set contract every
//!   storage strategy implements.
//! - Driven Port (outbound): the host storage primitive,
//!   [`shared_types::ExternalStorage`], reached through
//!   [`crate::handler::StorageHandler`].

pub mod inbound;

pub use inbound::DurableCache;
