//! Domain Layer - candidate suffix generation (pure).

pub mod candidates;

pub use candidates::{candidate_suffixes, host_fallback};
