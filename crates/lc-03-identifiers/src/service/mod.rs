//! Service Layer - identifier lifecycle and scraping.

pub mod first_party;
pub mod scraper;

pub use first_party::{FirstPartyIdentifier, DEFAULT_EXPIRATION_DAYS, DURABLE_ID_KEY};
pub use scraper::{IdentifierScraper, ScrapedIdentifiers};
