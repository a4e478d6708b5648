//! # Global Bus Registry
//!
//! Process-wide slots holding named buses, standing in for the page-wide
//! global scope a tag would otherwise attach its bus to.
//!
//! ## Lifecycle
//!
//! A slot is created on first access and is never torn down. Acquiring a
//! slot is idempotent:
//!
//! | Slot contents | Result |
//! |---------------|--------|
//! | empty | new global bus installed |
//! | global bus | returned as-is |
//! | local bus (hierarchical, wrong role) | promoted to global in place |
//! | standalone bus (no marker) | replaced by a global bus that inherits its replay buffers |

use crate::bus::{BusRole, ReplayBus};
use crate::GLOBAL_BUS_NAME;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static SLOTS: OnceLock<Mutex<HashMap<String, Arc<ReplayBus>>>> = OnceLock::new();

fn slots() -> &'static Mutex<HashMap<String, Arc<ReplayBus>>> {
    SLOTS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Get or create the global bus in slot `name`.
pub fn acquire_global(name: &str, replay_size: usize) -> Arc<ReplayBus> {
    let mut slots = slots().lock();

    if let Some(existing) = slots.get(name) {
        match existing.role() {
            BusRole::Global => return Arc::clone(existing),
            BusRole::Local => {
                debug!(slot = %name, "Promoting local bus in global slot");
                existing.promote_to_global();
                return Arc::clone(existing);
            }
            BusRole::Standalone => {
                debug!(slot = %name, "Replacing non-hierarchical bus in global slot");
                let global = ReplayBus::global(replay_size);
                global.absorb_buffers_from(existing);
                slots.insert(name.to_string(), Arc::clone(&global));
                return global;
            }
        }
    }

    let global = ReplayBus::global(replay_size);
    slots.insert(name.to_string(), Arc::clone(&global));
    debug!(slot = %name, replay_size = global.replay_size(), "Global bus created");
    global
}

/// Put `bus` in slot `name`, returning the previous occupant.
pub fn install(name: &str, bus: Arc<ReplayBus>) -> Option<Arc<ReplayBus>> {
    slots().lock().insert(name.to_string(), bus)
}

/// Current occupant of slot `name`.
pub fn lookup(name: &str) -> Option<Arc<ReplayBus>> {
    slots().lock().get(name).cloned()
}

/// Bus for a new tag instance: a local bus linked to the well-known global bus.
pub fn init_bus(replay_size: usize) -> Arc<ReplayBus> {
    init_bus_in(GLOBAL_BUS_NAME, replay_size)
}

/// [`init_bus`] against an arbitrary slot.
pub fn init_bus_in(slot: &str, replay_size: usize) -> Arc<ReplayBus> {
    let global = acquire_global(slot, replay_size);
    ReplayBus::local(replay_size, Some(&global))
}
