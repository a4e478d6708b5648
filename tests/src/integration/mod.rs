//! # Integration Flows
//!
//! Each module exercises several crates together through their public APIs.

pub mod bus_hierarchy;
pub mod identity_flow;
pub mod storage_degradation;
