//! Time source port.
//!
//! Expiry decisions (cache records, resolution responses) read the clock
//! through this trait so tests can pin and advance time.

use chrono::{DateTime, Utc};

/// Time source for consistent timestamp handling.
pub trait TimeSource: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockTimeSource {
    millis: std::sync::atomic::AtomicI64,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTimeSource {
    pub fn new(initial: DateTime<Utc>) -> Self {
        Self {
            millis: std::sync::atomic::AtomicI64::new(initial.timestamp_millis()),
        }
    }

    /// Clock starting at the current wall-clock time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.millis
            .fetch_add(by.num_milliseconds(), std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set(&self, time: DateTime<Utc>) {
        self.millis
            .store(time.timestamp_millis(), std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl TimeSource for MockTimeSource {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(std::sync::atomic::Ordering::SeqCst);
        DateTime::from_timestamp_millis(millis).unwrap_or_default()
    }
}
