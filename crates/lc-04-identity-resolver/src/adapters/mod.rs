//! Adapters Layer - concrete transports.

pub mod http;

pub use http::{HttpGet, HttpResponse, TokioTransport};
