//! Per-parameter cache keys.
//!
//! Two calls whose additional params differ only in key order share a key.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Key for calls without additional params; others append `_<hash>`.
pub const CACHE_KEY_PREFIX: &str = "__li_idex_cache";

const HASH_LENGTH: usize = 16;

/// JSON text of `value` with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, inner)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(inner, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, inner) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(inner, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Storage key for a call with `additional_params`.
pub fn cache_key(additional_params: &Value) -> String {
    let empty = match additional_params {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        return CACHE_KEY_PREFIX.to_string();
    }

    let digest = hex::encode(Sha256::digest(canonical_json(additional_params).as_bytes()));
    format!("{CACHE_KEY_PREFIX}_{}", &digest[..HASH_LENGTH])
}
