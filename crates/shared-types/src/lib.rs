//! # Shared Types Crate
//!
//! Types shared by every durable-identity crate: the error-shaped object
//! carried on the error topic, the host storage port and strategy, the time
//! source port and scraped identifier values.
//!
//! ## Design Principles
//!
//! - **Ports, not hosts**: the browser is reached only through
//!   [`ExternalStorage`]; nothing here knows about `document` or `window`.
//! - **Optional capabilities**: every storage function may be missing, and
//!   the default trait methods say so with [`StorageError::Unsupported`].

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod errors;
pub mod identifiers;
pub mod storage;
pub mod time;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use errors::*;
pub use identifiers::RetrievedIdentifier;
pub use storage::{ExternalStorage, SameSite, StorageStrategy, UnknownStrategy};
pub use time::{SystemTimeSource, TimeSource};

#[cfg(any(test, feature = "test-utils"))]
pub use time::MockTimeSource;
