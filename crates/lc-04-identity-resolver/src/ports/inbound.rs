//! Inbound Ports (Driving Ports)
//!
//! The callback contract offered to the embedding tag. Exactly one of the
//! two callbacks runs for each call, either synchronously (cache hit,
//! invalid params) or when the transport completes.

use serde_json::Value;

use crate::domain::ResolvedAttributes;
use crate::error::ResolutionError;

pub type OnSuccess = Box<dyn FnOnce(ResolvedAttributes) + Send>;
pub type OnError = Box<dyn FnOnce(ResolutionError) + Send>;

pub trait IdentityResolutionApi: Send + Sync {
    /// Resolve identity attributes for `additional_params` (an object or `null`).
    fn resolve(&self, on_success: OnSuccess, on_error: OnError, additional_params: &Value);

    /// URL a call with `additional_params` would request.
    fn get_url(&self, additional_params: &Value) -> String;
}
