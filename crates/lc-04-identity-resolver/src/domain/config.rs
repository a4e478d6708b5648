//! Resolution endpoint configuration
//!
//! # Example
//!
//! ```ignore
//! let config = IdentityResolutionConfig::default()
//!     .with_source("publisher-site")
//!     .with_publisher_id("12345");
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Identity resolution endpoint and request settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityResolutionConfig {
    /// Base URL of the resolution endpoint, without trailing path.
    pub url: String,
    /// Integration source, first path segment.
    pub source: String,
    /// Publisher identifier, second path segment.
    pub publisher_id: String,
    /// Cache lifetime when the response carries no `Expires` header.
    pub expiration_hours: u32,
    pub timeout_ms: u64,
    /// Attributes asked for with `resolve=`.
    pub requested_attributes: Vec<String>,
}

impl Default for IdentityResolutionConfig {
    fn default() -> Self {
        Self {
            url: "https://idx.liadm.com/idex".to_string(),
            source: "unknown".to_string(),
            publisher_id: "any".to_string(),
            expiration_hours: 1,
            timeout_ms: 5_000,
            requested_attributes: vec!["nonId".to_string()],
        }
    }
}

impl IdentityResolutionConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_publisher_id(mut self, publisher_id: impl Into<String>) -> Self {
        self.publisher_id = publisher_id.into();
        self
    }

    pub fn with_expiration_hours(mut self, hours: u32) -> Self {
        self.expiration_hours = hours;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_requested_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.expiration_hours == 0 {
            return Err(ConfigError::ZeroExpiration);
        }
        Ok(())
    }
}
