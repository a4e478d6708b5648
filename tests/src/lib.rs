//! # Durable-Identity Test Suite
//!
//! Cross-crate flows, wired the way an embedding tag wires the crates.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # TagInstance: bus → storage → apex → cache → ids → resolver
//! └── integration/
//!     ├── bus_hierarchy.rs       # local/global forwarding, replay, error topic
//!     ├── storage_degradation.rs # missing/failing storage, expiry repair
//!     └── identity_flow.rs       # durable id, scraping, resolution end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lc-tests
//! LC_LOG_LEVEL=debug cargo test -p lc-tests integration:: -- --nocapture
//! ```

#![allow(dead_code)]

pub mod harness;
pub mod integration;
