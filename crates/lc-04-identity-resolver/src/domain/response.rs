//! Response handling: body parsing and cache expiry.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::error::ResolutionError;

/// Resolved identity attributes, as returned by the endpoint.
pub type ResolvedAttributes = Map<String, Value>;

/// Parse a response body. An empty body is an empty object.
pub fn parse_body(body: &str) -> Result<ResolvedAttributes, ResolutionError> {
    if body.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ResolutionError::Parse("response is not an object".to_string())),
        Err(e) => Err(ResolutionError::Parse(e.to_string())),
    }
}

/// Cache expiry: the `Expires` header when it parses, else `now + hours`.
pub fn response_expiry(
    expires_header: Option<&str>,
    now: DateTime<Utc>,
    fallback_hours: u32,
) -> DateTime<Utc> {
    expires_header
        .and_then(|raw| DateTime::parse_from_rfc2822(raw.trim()).ok())
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|| now + Duration::hours(i64::from(fallback_hours)))
}
