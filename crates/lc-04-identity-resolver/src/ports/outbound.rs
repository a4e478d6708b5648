//! Outbound Ports (Driven Ports)
//!
//! The host's HTTP GET primitive. Implementations call exactly one of the
//! callbacks, once, from any thread. Dropping both uncalled fails the request
//! with [`TransportError::Dropped`].

use std::collections::HashMap;
use std::time::Duration;

use crate::error::TransportError;

pub type TransportSuccess = Box<dyn FnOnce(String, ResponseMeta) + Send>;
pub type TransportFailure = Box<dyn FnOnce(TransportError) + Send>;

/// Response metadata passed alongside a successful body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    headers: HashMap<String, String>,
}

impl ResponseMeta {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

pub trait Transport: Send + Sync {
    fn get(
        &self,
        url: &str,
        timeout: Duration,
        on_success: TransportSuccess,
        on_error: TransportFailure,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let meta = ResponseMeta::new(200).with_header("Expires", "x");
        assert_eq!(meta.header("expires"), Some("x"));
        assert_eq!(meta.header("EXPIRES"), Some("x"));
        assert_eq!(meta.header("date"), None);
    }
}
