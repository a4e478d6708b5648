//! # Replay Bus
//!
//! Topic-addressed publish/subscribe with a bounded per-topic replay buffer.
//!
//! ## Hierarchy
//!
//! ```text
//!   ┌──────────────┐  linked_global (strong)  ┌──────────────┐
//!   │  local bus   │ ───────────────────────→ │  global bus  │
//!   │ (tag inst.)  │ ←─────────────────────── │ (page-wide)  │
//!   └──────────────┘  current_local (weak)    └──────────────┘
//! ```
//!
//! Every emission is forwarded exactly one hop along the link of the bus it
//! was emitted on. The receiving bus records it in its own replay buffer and
//! runs its own handlers, and never forwards it again.

use crate::{DEFAULT_REPLAY_SIZE, ERROR_TOPIC};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shared_types::ErrorDetails;
use std::collections::{HashMap, VecDeque};
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// Ordered argument tuple of one emission.
pub type EventArgs = Vec<Value>;

/// Topic handler. Identity (for [`ReplayBus::off`]) is the `Arc` pointer.
pub type Handler = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Position of a bus in the two-tier hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusRole {
    /// No hierarchical marker: a plain bus that never forwards.
    Standalone,
    /// Per tag instance; forwards to its linked global bus.
    Local,
    /// One per process; forwards to its current local bus.
    Global,
}

impl BusRole {
    /// Whether the bus carries the hierarchical marker.
    pub fn is_hierarchical(self) -> bool {
        !matches!(self, Self::Standalone)
    }
}

#[derive(Clone)]
struct Registration {
    handler: Handler,
    /// Removed from the live list the first time it is dispatched.
    once: bool,
}

#[derive(Default)]
struct BusState {
    handlers: HashMap<String, Vec<Registration>>,
    buffers: HashMap<String, VecDeque<EventArgs>>,
}

fn same_handler(a: &Handler, b: &Handler) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Normalize a configured replay size.
///
/// Anything that is not a positive integer falls back to
/// [`DEFAULT_REPLAY_SIZE`].
pub fn replay_size_from(setting: Option<&Value>) -> usize {
    setting
        .and_then(Value::as_i64)
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(DEFAULT_REPLAY_SIZE)
}

/// Publish/subscribe bus with per-topic replay.
pub struct ReplayBus {
    replay_size: usize,
    role: RwLock<BusRole>,
    state: Mutex<BusState>,
    linked_global: RwLock<Option<Arc<ReplayBus>>>,
    current_local: RwLock<Option<Weak<ReplayBus>>>,
    events_emitted: AtomicU64,
}

impl fmt::Debug for ReplayBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayBus")
            .field("role", &self.role())
            .field("replay_size", &self.replay_size)
            .field("events_emitted", &self.events_emitted())
            .finish_non_exhaustive()
    }
}

impl Default for ReplayBus {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_SIZE)
    }
}

impl ReplayBus {
    /// Create a standalone bus. A replay size of zero uses the default.
    #[must_use]
    pub fn new(replay_size: usize) -> Self {
        Self::with_role(replay_size, BusRole::Standalone)
    }

    pub(crate) fn with_role(replay_size: usize, role: BusRole) -> Self {
        let replay_size = if replay_size == 0 {
            DEFAULT_REPLAY_SIZE
        } else {
            replay_size
        };
        Self {
            replay_size,
            role: RwLock::new(role),
            state: Mutex::new(BusState::default()),
            linked_global: RwLock::new(None),
            current_local: RwLock::new(None),
            events_emitted: AtomicU64::new(0),
        }
    }

    /// Create a global bus outside the registry.
    ///
    /// Most callers want [`crate::registry::acquire_global`] instead.
    #[must_use]
    pub fn global(replay_size: usize) -> Arc<Self> {
        Arc::new(Self::with_role(replay_size, BusRole::Global))
    }

    /// Create a local bus, optionally linked to `global`.
    ///
    /// The new bus becomes the global's current local bus, superseding any
    /// previous one.
    #[must_use]
    pub fn local(replay_size: usize, global: Option<&Arc<ReplayBus>>) -> Arc<Self> {
        let local = Arc::new(Self::with_role(replay_size, BusRole::Local));
        if let Some(global) = global {
            local.link_to_global(global);
        }
        local
    }

    /// Link this local bus to `global` and make it the global's current local.
    pub fn link_to_global(self: &Arc<Self>, global: &Arc<ReplayBus>) {
        if Arc::ptr_eq(self, global) {
            return;
        }
        *self.linked_global.write() = Some(Arc::clone(global));
        *global.current_local.write() = Some(Arc::downgrade(self));
        debug!("Local bus linked to global bus");
    }

    pub fn role(&self) -> BusRole {
        *self.role.read()
    }

    pub fn replay_size(&self) -> usize {
        self.replay_size
    }

    /// Total emissions made directly on this bus (forwarded ones excluded).
    pub fn events_emitted(&self) -> u64 {
        self.events_emitted.load(Ordering::Relaxed)
    }

    /// The global bus this local bus forwards to.
    pub fn linked_global(&self) -> Option<Arc<ReplayBus>> {
        self.linked_global.read().clone()
    }

    /// The local bus this global bus currently forwards to.
    pub fn current_local(&self) -> Option<Arc<ReplayBus>> {
        self.current_local.read().as_ref().and_then(Weak::upgrade)
    }

    /// Register a persistent handler, replaying buffered tuples first.
    pub fn on(&self, topic: &str, handler: Handler) -> &Self {
        for args in self.buffered(topic) {
            handler(&args);
        }
        self.state
            .lock()
            .handlers
            .entry(topic.to_string())
            .or_default()
            .push(Registration {
                handler,
                once: false,
            });
        self
    }

    /// Invoke `handler` once.
    ///
    /// With a non-empty buffer it runs immediately with the oldest buffered
    /// tuple only; otherwise it runs on the next emission and is removed.
    pub fn once(&self, topic: &str, handler: Handler) -> &Self {
        let oldest = {
            let mut state = self.state.lock();
            match state.buffers.get(topic).and_then(|b| b.front().cloned()) {
                Some(args) => Some(args),
                None => {
                    state
                        .handlers
                        .entry(topic.to_string())
                        .or_default()
                        .push(Registration {
                            handler: Arc::clone(&handler),
                            once: true,
                        });
                    None
                }
            }
        };
        if let Some(args) = oldest {
            handler(&args);
        }
        self
    }

    /// Remove `handler` from `topic`, or every handler of `topic` when `None`.
    ///
    /// The replay buffer is left untouched.
    pub fn off(&self, topic: &str, handler: Option<&Handler>) -> &Self {
        let mut state = self.state.lock();
        match handler {
            Some(handler) => {
                if let Some(registrations) = state.handlers.get_mut(topic) {
                    registrations.retain(|r| !same_handler(&r.handler, handler));
                }
            }
            None => {
                state.handlers.remove(topic);
            }
        }
        self
    }

    /// Emit `args` on `topic`.
    ///
    /// Buffer bookkeeping on this bus and on the forward target completes
    /// before any handler runs, and no lock is held while handlers run.
    pub fn emit(&self, topic: &str, args: EventArgs) -> &Self {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);

        let local_handlers = self.record(topic, &args);
        let forwarded = self
            .forward_target()
            .map(|target| target.record(topic, &args));

        trace!(
            topic = %topic,
            handlers = local_handlers.len(),
            forwarded = forwarded.is_some(),
            "Event emitted"
        );

        for registration in local_handlers {
            (registration.handler)(&args);
        }
        for registration in forwarded.into_iter().flatten() {
            (registration.handler)(&args);
        }
        self
    }

    /// Emit `error` on the error topic under `name`.
    ///
    /// The caller's source position is recorded in the event.
    #[track_caller]
    pub fn emit_error(&self, name: &str, error: &(dyn Error + 'static)) -> &Self {
        let details = ErrorDetails::from_error(name, None, error, Location::caller());
        self.emit_error_details(details)
    }

    /// Like [`Self::emit_error`], overriding the event message.
    #[track_caller]
    pub fn emit_error_with_message(
        &self,
        name: &str,
        message: &str,
        error: &(dyn Error + 'static),
    ) -> &Self {
        let details = ErrorDetails::from_error(name, Some(message), error, Location::caller());
        self.emit_error_details(details)
    }

    fn emit_error_details(&self, details: ErrorDetails) -> &Self {
        warn!(
            name = %details.name,
            message = %details.message,
            "Error reported on bus"
        );
        self.emit(ERROR_TOPIC, details.to_args())
    }

    /// Snapshot of the replay buffer for `topic`, oldest first.
    pub fn buffered(&self, topic: &str) -> Vec<EventArgs> {
        self.state
            .lock()
            .buffers
            .get(topic)
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of live handlers for `topic`.
    pub fn handler_count(&self, topic: &str) -> usize {
        self.state
            .lock()
            .handlers
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Append to the buffer and snapshot the handlers to dispatch.
    fn record(&self, topic: &str, args: &EventArgs) -> Vec<Registration> {
        let mut state = self.state.lock();

        let buffer = state.buffers.entry(topic.to_string()).or_default();
        while buffer.len() >= self.replay_size {
            buffer.pop_front();
        }
        buffer.push_back(args.clone());

        match state.handlers.get_mut(topic) {
            Some(registrations) => {
                let snapshot = registrations.clone();
                registrations.retain(|r| !r.once);
                snapshot
            }
            None => Vec::new(),
        }
    }

    fn forward_target(&self) -> Option<Arc<ReplayBus>> {
        match self.role() {
            BusRole::Standalone => None,
            BusRole::Local => self.linked_global(),
            BusRole::Global => self.current_local(),
        }
    }

    /// Give a local bus found in the global slot the global role.
    pub(crate) fn promote_to_global(&self) {
        *self.role.write() = BusRole::Global;
        *self.linked_global.write() = None;
    }

    /// Copy `other`'s replay buffers into this bus, keeping the newest
    /// entries that fit this bus's replay size.
    pub(crate) fn absorb_buffers_from(&self, other: &ReplayBus) {
        let buffers = other.state.lock().buffers.clone();
        let mut state = self.state.lock();
        for (topic, entries) in buffers {
            let skip = entries.len().saturating_sub(self.replay_size);
            state
                .buffers
                .insert(topic, entries.into_iter().skip(skip).collect());
        }
    }
}
