//! # LC Telemetry
//!
//! Structured logging for the durable-identity crates. Library crates only
//! emit `tracing` events; a host that wants them printed calls
//! [`init_telemetry`] once at startup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lc_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `durable-identity` | Service name in logs |
//! | `LC_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `LC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `LC_JSON_LOGS` | `false` | JSON lines instead of human-readable output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install logging for the process.
///
/// Hold the returned guard for the lifetime of the host.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that marks telemetry as active.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
