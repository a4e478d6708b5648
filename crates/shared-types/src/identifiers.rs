//! Visitor identifier values shared between the scraper and the resolver.

use serde::{Deserialize, Serialize};

/// An identifier read from a named cookie or persistent-storage record.
///
/// `value` never contains a raw e-mail address: scraped values have every
/// address replaced by its hash before they are wrapped in this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedIdentifier {
    /// Cookie / record name the value was read from; also the query key.
    pub name: String,
    pub value: String,
}

impl RetrievedIdentifier {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
