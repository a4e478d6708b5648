//! Recording transport for tests.
//!
//! Answers immediately with a fixed response or failure, holds calls until
//! the test completes them, or discards them unanswered.

use parking_lot::Mutex;
use std::time::Duration;

use crate::error::TransportError;
use crate::ports::{ResponseMeta, Transport, TransportFailure, TransportSuccess};

enum Behavior {
    Respond { body: String, meta: ResponseMeta },
    Fail(TransportError),
    Defer,
    Discard,
}

struct Deferred {
    on_success: TransportSuccess,
    on_error: TransportFailure,
}

/// [`Transport`] that records every requested URL.
pub struct RecordingTransport {
    behavior: Mutex<Behavior>,
    calls: Mutex<Vec<(String, Duration)>>,
    deferred: Mutex<Vec<Deferred>>,
}

impl RecordingTransport {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            calls: Mutex::new(Vec::new()),
            deferred: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with `body` and status 200.
    pub fn responding(body: &str) -> Self {
        Self::responding_with(body, ResponseMeta::new(200))
    }

    pub fn responding_with(body: &str, meta: ResponseMeta) -> Self {
        Self::with_behavior(Behavior::Respond {
            body: body.to_string(),
            meta,
        })
    }

    pub fn failing(error: TransportError) -> Self {
        Self::with_behavior(Behavior::Fail(error))
    }

    /// Hold every call until [`Self::complete_next`] or [`Self::fail_next`].
    pub fn deferred() -> Self {
        Self::with_behavior(Behavior::Defer)
    }

    /// Drop every call's callbacks without invoking them.
    pub fn discarding() -> Self {
        Self::with_behavior(Behavior::Discard)
    }

    pub fn respond_with(&self, body: &str) {
        *self.behavior.lock() = Behavior::Respond {
            body: body.to_string(),
            meta: ResponseMeta::new(200),
        };
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        self.calls.lock().last().map(|(_, timeout)| *timeout)
    }

    pub fn pending(&self) -> usize {
        self.deferred.lock().len()
    }

    /// Complete the oldest held call; `false` when none is held.
    pub fn complete_next(&self, body: &str, meta: ResponseMeta) -> bool {
        let next = self.take_next();
        match next {
            Some(call) => {
                (call.on_success)(body.to_string(), meta);
                true
            }
            None => false,
        }
    }

    pub fn fail_next(&self, error: TransportError) -> bool {
        let next = self.take_next();
        match next {
            Some(call) => {
                (call.on_error)(error);
                true
            }
            None => false,
        }
    }

    /// Drop every held call unanswered.
    pub fn discard_pending(&self) {
        let held = std::mem::take(&mut *self.deferred.lock());
        drop(held);
    }

    fn take_next(&self) -> Option<Deferred> {
        let mut deferred = self.deferred.lock();
        if deferred.is_empty() {
            None
        } else {
            Some(deferred.remove(0))
        }
    }
}

impl Transport for RecordingTransport {
    fn get(
        &self,
        url: &str,
        timeout: Duration,
        on_success: TransportSuccess,
        on_error: TransportFailure,
    ) {
        self.calls.lock().push((url.to_string(), timeout));

        let immediate = match &*self.behavior.lock() {
            Behavior::Respond { body, meta } => Some(Ok((body.clone(), meta.clone()))),
            Behavior::Fail(error) => Some(Err(error.clone())),
            Behavior::Defer => None,
            Behavior::Discard => return,
        };

        match immediate {
            Some(Ok((body, meta))) => on_success(body, meta),
            Some(Err(error)) => on_error(error),
            None => self.deferred.lock().push(Deferred {
                on_success,
                on_error,
            }),
        }
    }
}
