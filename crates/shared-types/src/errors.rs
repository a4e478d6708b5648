//! # Error Types
//!
//! Defines error types used across the durable-identity crates, plus the
//! error-shaped object carried on the reserved error topic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// A single operation of the host storage primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StorageCapability {
    GetCookie,
    SetCookie,
    GetFromPersistent,
    SetInPersistent,
    RemovePersistent,
    FindKeysWithPrefix,
    PersistentStorageAvailable,
}

impl StorageCapability {
    /// Every capability, in declaration order.
    pub const ALL: [StorageCapability; 7] = [
        Self::GetCookie,
        Self::SetCookie,
        Self::GetFromPersistent,
        Self::SetInPersistent,
        Self::RemovePersistent,
        Self::FindKeysWithPrefix,
        Self::PersistentStorageAvailable,
    ];

    /// Name of the host function backing this capability.
    pub fn function_name(self) -> &'static str {
        match self {
            Self::GetCookie => "getCookie",
            Self::SetCookie => "setCookie",
            Self::GetFromPersistent => "getFromPersistent",
            Self::SetInPersistent => "setInPersistent",
            Self::RemovePersistent => "removePersistent",
            Self::FindKeysWithPrefix => "findKeysWithPrefix",
            Self::PersistentStorageAvailable => "persistentStorageAvailable",
        }
    }
}

impl fmt::Display for StorageCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

/// Errors raised by a storage primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The host did not supply this function.
    #[error("storage primitive does not provide {0}")]
    Unsupported(StorageCapability),

    /// The host function was called and failed (quota, security policy, ...).
    #[error("{operation} failed: {reason}")]
    Operation {
        operation: StorageCapability,
        reason: String,
    },
}

/// Error-shaped object emitted on the reserved error topic.
///
/// Mirrors the fields a page-level error reporter expects: `name`,
/// `message`, `stack` and optional source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub name: String,
    pub message: String,
    pub stack: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl ErrorDetails {
    /// Normalize `error` into an error event.
    ///
    /// `message` defaults to the error's own `Display` output. The stack is
    /// the error followed by its `source()` chain, one cause per line.
    pub fn from_error(
        name: &str,
        message: Option<&str>,
        error: &(dyn Error + 'static),
        location: &Location<'_>,
    ) -> Self {
        let own_message = error.to_string();
        let mut stack = format!("{name}: {own_message}");
        let mut source = error.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        stack.push_str(&format!("\n    at {location}"));

        Self {
            name: name.to_string(),
            message: message.map_or(own_message, str::to_string),
            stack,
            line_number: Some(location.line()),
            column_number: Some(location.column()),
            file_name: Some(location.file().to_string()),
        }
    }

    /// Error event without an underlying error value.
    pub fn from_message(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            stack: format!("{name}: {message}"),
            line_number: None,
            column_number: None,
            file_name: None,
        }
    }

    /// Serialize into the single-argument tuple carried on the error topic.
    pub fn to_args(&self) -> Vec<Value> {
        // Serializing a struct of strings and integers cannot fail.
        vec![serde_json::to_value(self).unwrap_or(Value::Null)]
    }

    /// Recover the error event from an error-topic tuple.
    pub fn from_args(args: &[Value]) -> Option<Self> {
        args.first()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
