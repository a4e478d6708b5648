//! Scrapes publisher-configured identifiers from cookies and persistent
//! storage. E-mail addresses inside a value are replaced by their hash.

use lc_01_durable_cache::StorageHandler;
use shared_types::RetrievedIdentifier;
use std::sync::Arc;
use tracing::debug;

use crate::domain::replace_emails_with_hashes;

/// Output of [`IdentifierScraper::scrape`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedIdentifiers {
    pub identifiers: Vec<RetrievedIdentifier>,
    /// Hashes of every e-mail address found, deduplicated.
    pub hashes: Vec<String>,
}

pub struct IdentifierScraper {
    handler: Arc<StorageHandler>,
}

impl IdentifierScraper {
    pub fn new(handler: Arc<StorageHandler>) -> Self {
        Self { handler }
    }

    /// Read each named identifier, cookie first, then persistent storage.
    ///
    /// Blank names and values are skipped; a repeated name is read once.
    pub fn scrape<S: AsRef<str>>(&self, names: &[S]) -> ScrapedIdentifiers {
        let mut scraped = ScrapedIdentifiers::default();

        for name in names.iter().map(|n| n.as_ref().trim()) {
            if name.is_empty() || scraped.identifiers.iter().any(|i| i.name == name) {
                continue;
            }
            let Some(raw) = self.read(name) else {
                continue;
            };

            let cleaned = replace_emails_with_hashes(raw.trim());
            for hash in cleaned.hashes {
                if !scraped.hashes.contains(&hash) {
                    scraped.hashes.push(hash);
                }
            }
            scraped
                .identifiers
                .push(RetrievedIdentifier::new(name, cleaned.value));
        }

        debug!(
            requested = names.len(),
            found = scraped.identifiers.len(),
            hashes = scraped.hashes.len(),
            "Identifiers scraped"
        );
        scraped
    }

    fn read(&self, name: &str) -> Option<String> {
        self.handler
            .get_cookie(name)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.handler.get_data_from_persistent(name))
            .filter(|v| !v.trim().is_empty())
    }
}
