//! Domain Layer - identifier generation and e-mail hashing (pure).

pub mod durable_id;
pub mod email;

pub use durable_id::{domain_hash, generate_durable_id, DOMAIN_HASH_LENGTH};
pub use email::{hash_email, replace_emails_with_hashes, EmailScrubbed};
