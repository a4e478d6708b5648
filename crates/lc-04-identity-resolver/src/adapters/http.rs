//! Async HTTP client adapter.
//!
//! Bridges an `async` GET client to the callback [`Transport`] port: each
//! call is spawned on a tokio runtime and bounded by the request timeout.
//!
//! | Client result | Callback |
//! |---------------|----------|
//! | 2xx | `on_success(body, meta)` |
//! | other status | `on_error(Status)` |
//! | client error | `on_error(error)` |
//! | timeout elapsed | `on_error(Timeout)` |

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;

use crate::error::TransportError;
use crate::ports::{ResponseMeta, Transport, TransportFailure, TransportSuccess};

/// A completed HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    fn meta(&self) -> ResponseMeta {
        self.headers
            .iter()
            .fold(ResponseMeta::new(self.status), |meta, (name, value)| {
                meta.with_header(name, value.clone())
            })
    }
}

/// Minimal async GET client.
#[async_trait]
pub trait HttpGet: Send + Sync + 'static {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] over an [`HttpGet`] client.
pub struct TokioTransport<C> {
    client: Arc<C>,
    runtime: Handle,
}

impl<C: HttpGet> TokioTransport<C> {
    pub fn new(client: C, runtime: Handle) -> Self {
        Self {
            client: Arc::new(client),
            runtime,
        }
    }

    /// Transport on the runtime of the calling context, if there is one.
    pub fn current(client: C) -> Option<Self> {
        Handle::try_current()
            .ok()
            .map(|runtime| Self::new(client, runtime))
    }
}

impl<C: HttpGet> Transport for TokioTransport<C> {
    fn get(
        &self,
        url: &str,
        timeout: Duration,
        on_success: TransportSuccess,
        on_error: TransportFailure,
    ) {
        let client = Arc::clone(&self.client);
        let url = url.to_string();

        self.runtime.spawn(async move {
            match tokio::time::timeout(timeout, client.get(&url)).await {
                Ok(Ok(response)) if (200..300).contains(&response.status) => {
                    let meta = response.meta();
                    on_success(response.body, meta);
                }
                Ok(Ok(response)) => {
                    debug!(url = %url, status = response.status, "Unexpected status");
                    on_error(TransportError::Status {
                        status: response.status,
                    });
                }
                Ok(Err(e)) => on_error(e),
                Err(_) => on_error(TransportError::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            }
        });
    }
}
