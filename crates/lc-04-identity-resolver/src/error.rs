//! Error types for identity resolution

use thiserror::Error;

/// Failures reported by a [`crate::ports::Transport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Unexpected status: {status}")]
    Status { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The transport released the request's callbacks without calling either.
    #[error("Request dropped by transport")]
    Dropped,
}

/// Outcome delivered to a failed resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Additional params must be an object, got {0}")]
    InvalidParams(String),

    #[error("Resolution abandoned before completion")]
    Cancelled,
}

/// Rejected [`crate::domain::IdentityResolutionConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Resolution url must not be empty")]
    EmptyUrl,

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Expiration must be greater than zero")]
    ZeroExpiration,
}
