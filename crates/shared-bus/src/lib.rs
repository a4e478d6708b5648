//! # Shared Bus - Replay Bus for Decoupled Error/Event Propagation
//!
//! Every durable-identity component reports recoverable failures here
//! instead of returning them across its public boundary.
//!
//! ## Replay
//!
//! ```text
//! emit(t, a1) emit(t, a2) emit(t, a3)        on(t, h)
//!      │           │           │                │
//!      ▼           ▼           ▼                ▼
//!   ┌─────────────────────────────┐   replay a1,a2,a3 → h,
//!   │ buffer[t] (last N, FIFO)    │ ─ then h is live
//!   └─────────────────────────────┘
//! ```
//!
//! ## Conventions
//!
//! - [`ERROR_TOPIC`] carries a single serialized
//!   [`shared_types::ErrorDetails`]; use [`ReplayBus::emit_error`].
//! - Any other topic is a domain topic whose tuple shape is agreed by name.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod registry;

// Re-export main types
pub use bus::{replay_size_from, BusRole, EventArgs, Handler, ReplayBus};
pub use registry::{acquire_global, init_bus, init_bus_in, install, lookup};

/// Replay buffer length used when none (or an invalid one) is configured.
pub const DEFAULT_REPLAY_SIZE: usize = 5;

/// Reserved topic for error-shaped events.
pub const ERROR_TOPIC: &str = "li_errors";

/// Registry slot of the page-wide global bus.
pub const GLOBAL_BUS_NAME: &str = "__li__evt_bus";
