//! # Bus Hierarchy Flows
//!
//! Local buses created through the registry, forwarding to the global bus,
//! and error events from the storage layer surfacing globally.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    use lc_01_durable_cache::{StorageHandler, STORAGE_HANDLER_ERROR};
    use shared_bus::{init_bus_in, lookup, EventArgs, Handler, ReplayBus, ERROR_TOPIC};
    use shared_types::testing::InMemoryStorage;
    use shared_types::{ErrorDetails, StorageCapability, StorageStrategy};

    fn recorder() -> (Handler, Arc<Mutex<Vec<EventArgs>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: Handler = Arc::new(move |args: &[Value]| sink.lock().push(args.to_vec()));
        (handler, seen)
    }

    #[test]
    fn test_emission_reaches_global_but_not_sibling_local() {
        let slot = "it_emission_reaches_global_not_sibling";
        let local_a = init_bus_in(slot, 5);
        let local_b = init_bus_in(slot, 5);
        let global = lookup(slot).unwrap();

        let (on_global, global_seen) = recorder();
        let (on_b, b_seen) = recorder();
        global.on("pixel", on_global);
        local_b.on("pixel", on_b);

        local_a.emit("pixel", vec![json!({ "event": "viewContent" })]);

        assert_eq!(global_seen.lock().len(), 1);
        assert!(b_seen.lock().is_empty());
    }

    #[test]
    fn test_global_emission_reaches_current_local() {
        let slot = "it_global_emission_reaches_current_local";
        let stale = init_bus_in(slot, 5);
        let current = init_bus_in(slot, 5);
        let global = lookup(slot).unwrap();

        let (on_stale, stale_seen) = recorder();
        let (on_current, current_seen) = recorder();
        stale.on("t", on_stale);
        current.on("t", on_current);

        global.emit("t", vec![json!(1)]);

        assert!(stale_seen.lock().is_empty());
        assert_eq!(*current_seen.lock(), vec![vec![json!(1)]]);
    }

    #[test]
    fn test_storage_errors_surface_on_global_bus() {
        let slot = "it_storage_errors_surface_on_global_bus";
        let bus = init_bus_in(slot, 5);
        let storage = Arc::new(InMemoryStorage::new().without(StorageCapability::SetCookie));

        let _handler = StorageHandler::new(StorageStrategy::Cookie, storage, bus);

        let global = lookup(slot).unwrap();
        let names: Vec<String> = global
            .buffered(ERROR_TOPIC)
            .iter()
            .filter_map(|args| ErrorDetails::from_args(args))
            .map(|details| details.name)
            .collect();
        assert_eq!(names, vec![STORAGE_HANDLER_ERROR]);
    }

    #[test]
    fn test_late_global_subscriber_sees_errors_from_earlier_tag() {
        let slot = "it_late_global_subscriber_sees_errors";
        let bus = init_bus_in(slot, 5);
        bus.emit_error_with_message(
            "Tag",
            "first tag failed",
            &std::io::Error::other("boom"),
        );

        // A second tag instance on the page, then a monitoring script.
        let _second = init_bus_in(slot, 5);
        let (monitor, seen) = recorder();
        lookup(slot).unwrap().on(ERROR_TOPIC, monitor);

        let details = ErrorDetails::from_args(&seen.lock()[0]).unwrap();
        assert_eq!(details.name, "Tag");
        assert_eq!(details.message, "first tag failed");
    }

    proptest! {
        #[test]
        fn prop_forwarded_events_replay_last_n(
            replay_size in 1usize..8,
            extra in 0usize..8,
        ) {
            let global = ReplayBus::global(replay_size);
            let local = ReplayBus::local(replay_size, Some(&global));
            let total = replay_size + extra;
            for i in 0..total {
                local.emit("t", vec![json!(i)]);
            }

            let (handler, seen) = recorder();
            global.on("t", handler);

            let expected: Vec<EventArgs> = (extra..total).map(|i| vec![json!(i)]).collect();
            prop_assert_eq!(seen.lock().clone(), expected);
        }
    }
}
