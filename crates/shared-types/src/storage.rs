//! # Storage Port
//!
//! The host storage primitive (cookies plus a persistent key/value store)
//! and the strategy that chooses between them.
//!
//! Every primitive function is optional. Implementors override the methods
//! they support and list them in [`ExternalStorage::capabilities`]; the
//! defaults report [`StorageError::Unsupported`].

use crate::errors::{StorageCapability, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which backend the durable cache persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageStrategy {
    /// Browser cookies, shareable across subdomains of the apex domain.
    #[default]
    Cookie,
    /// Persistent per-origin storage (no native TTL).
    #[serde(alias = "ls", alias = "persistent")]
    LocalStorage,
    /// Nothing is persisted.
    #[serde(alias = "none")]
    Disabled,
}

/// Unrecognized strategy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown storage strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for StorageStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cookie" => Ok(Self::Cookie),
            "ls" | "persistent" | "localstorage" => Ok(Self::LocalStorage),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for StorageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cookie => "cookie",
            Self::LocalStorage => "ls",
            Self::Disabled => "disabled",
        })
    }
}

impl StorageStrategy {
    /// Parse a configured strategy name, falling back to [`Self::Cookie`].
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|err: UnknownStrategy| {
            tracing::warn!(error = %err, "Falling back to cookie storage strategy");
            Self::default()
        })
    }

    /// Strategy actually in force once consent is taken into account.
    ///
    /// A visitor in privacy mode (opted out, or no consent) gets nothing
    /// persisted regardless of configuration.
    pub fn effective(self, privacy_mode: bool) -> Self {
        if privacy_mode {
            Self::Disabled
        } else {
            self
        }
    }

    /// Primitive functions this strategy cannot work without.
    ///
    /// Cookie capabilities are required by every enabled strategy because
    /// apex-domain discovery always probes with cookies.
    pub fn required_capabilities(self) -> &'static [StorageCapability] {
        match self {
            Self::Cookie => &[StorageCapability::GetCookie, StorageCapability::SetCookie],
            Self::LocalStorage => &[
                StorageCapability::GetCookie,
                StorageCapability::SetCookie,
                StorageCapability::GetFromPersistent,
                StorageCapability::SetInPersistent,
                StorageCapability::RemovePersistent,
                StorageCapability::FindKeysWithPrefix,
                StorageCapability::PersistentStorageAvailable,
            ],
            Self::Disabled => &[],
        }
    }
}

/// `SameSite` attribute of a written cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
            Self::None => "None",
        })
    }
}

/// Host storage primitive (driven port).
///
/// Implementations wrap whatever the host offers: `document.cookie` and
/// `window.localStorage` in a browser, an in-memory jar in tests.
pub trait ExternalStorage: Send + Sync {
    /// Functions this primitive actually provides.
    fn capabilities(&self) -> Vec<StorageCapability>;

    fn get_cookie(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unsupported(StorageCapability::GetCookie))
    }

    /// Write a cookie. `expires == None` writes a session cookie; `domain ==
    /// None` scopes it to the current host only.
    fn set_cookie(
        &self,
        _key: &str,
        _value: &str,
        _expires: Option<DateTime<Utc>>,
        _same_site: SameSite,
        _domain: Option<&str>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Unsupported(StorageCapability::SetCookie))
    }

    fn get_from_persistent(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unsupported(StorageCapability::GetFromPersistent))
    }

    fn set_in_persistent(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unsupported(StorageCapability::SetInPersistent))
    }

    fn remove_persistent(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unsupported(StorageCapability::RemovePersistent))
    }

    fn find_keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, StorageError> {
        Err(StorageError::Unsupported(StorageCapability::FindKeysWithPrefix))
    }

    fn persistent_storage_available(&self) -> Result<bool, StorageError> {
        Err(StorageError::Unsupported(
            StorageCapability::PersistentStorageAvailable,
        ))
    }
}
