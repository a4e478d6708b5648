//! Handler Layer
//!
//! Guards every call into the host storage primitive: capability checks at
//! construction, error capture and reporting on every operation.

pub mod storage_handler;

pub use storage_handler::{StorageHandler, STORAGE_HANDLER_ERROR};
