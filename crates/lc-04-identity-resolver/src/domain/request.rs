//! Request composition.
//!
//! ## Query order
//!
//! | Pair | Present when |
//! |------|--------------|
//! | `duid` | durable identifier known |
//! | `us_privacy` | set |
//! | `gdpr` (`1`/`0`) | applicability known |
//! | `n3pc=1` | privacy mode |
//! | `gdpr_consent` | set |
//! | `<name>=<value>` | per retrieved identifier |
//! | `resolve=<attr>` | per requested attribute (`uid2` dropped in privacy mode) |
//! | additional params | scalars once, arrays once per element, nulls skipped |
//!
//! Keys and values are percent-encoded; empty values are skipped.

use serde_json::{Map, Value};

use super::config::IdentityResolutionConfig;
use super::visitor::VisitorState;
use crate::error::ResolutionError;

/// Attributes that are never requested in privacy mode.
pub const PRIVACY_MODE_BLOCKED_ATTRIBUTES: &[&str] = &["uid2"];

/// Ordered query pairs, unencoded.
pub fn query_pairs(
    config: &IdentityResolutionConfig,
    visitor: &VisitorState,
    additional_params: &Map<String, Value>,
) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: &str| {
        if !value.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    };

    if let Some(duid) = &visitor.durable_id {
        push("duid", duid);
    }
    if let Some(us_privacy) = &visitor.us_privacy {
        push("us_privacy", us_privacy);
    }
    if let Some(applies) = visitor.gdpr_applies {
        push("gdpr", if applies { "1" } else { "0" });
    }
    if visitor.privacy_mode {
        push("n3pc", "1");
    }
    if let Some(consent) = &visitor.gdpr_consent {
        push("gdpr_consent", consent);
    }
    for identifier in &visitor.retrieved_identifiers {
        push(&identifier.name, &identifier.value);
    }
    for attribute in &config.requested_attributes {
        if visitor.privacy_mode && PRIVACY_MODE_BLOCKED_ATTRIBUTES.contains(&attribute.as_str()) {
            continue;
        }
        push("resolve", attribute);
    }
    for (key, value) in additional_params {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = param_text(item) {
                        push(key, &text);
                    }
                }
            }
            other => {
                if let Some(text) = param_text(other) {
                    push(key, &text);
                }
            }
        }
    }

    pairs
}

fn param_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Additional params as an object map; `null` counts as empty.
pub(crate) fn params_object(
    additional_params: &Value,
) -> Result<Map<String, Value>, ResolutionError> {
    match additional_params {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map.clone()),
        other => Err(ResolutionError::InvalidParams(value_kind(other).to_string())),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `<url>/<source>/<publisher_id>` plus the encoded query.
pub fn compose_url(
    config: &IdentityResolutionConfig,
    visitor: &VisitorState,
    additional_params: &Map<String, Value>,
) -> String {
    let base = format!(
        "{}/{}/{}",
        config.url.trim_end_matches('/'),
        config.source,
        config.publisher_id
    );
    let query = query_pairs(config, visitor, additional_params)
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        base
    } else {
        format!("{base}?{query}")
    }
}
