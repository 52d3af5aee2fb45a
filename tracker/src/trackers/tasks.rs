//! Task run tracking with failure recovery.
//!
//! Each task run is recorded as a `task` event with subtype `success` or
//! `failure` keyed by task name. A successful run additionally resolves the
//! pending failure event for the same task, so "it finally builds" counts
//! as a recovery.

use serde_json::{Map, Value};
use tracing::debug;

use crate::ledger::EventLedger;
use crate::storage::Storage;
use crate::types::{Event, EventKey};

/// Records the end of a task run.
///
/// `exit_code == 0` is a success, anything else a failure. Extra `metadata`
/// is merged into the event; the `taskName` and `exitCode` entries are
/// always set from the arguments so recovery matching stays reliable.
///
/// Returns the key of the tracked event.
pub fn track_task<S: Storage>(
    ledger: &mut EventLedger<S>,
    task_name: &str,
    exit_code: i32,
    metadata: Option<Map<String, Value>>,
) -> EventKey {
    let subtype = if exit_code == 0 { "success" } else { "failure" };
    let description = format!("Task \"{task_name}\" {subtype}");

    let mut merged = metadata.unwrap_or_default();
    merged.insert("taskName".to_string(), Value::from(task_name));
    merged.insert("exitCode".to_string(), Value::from(exit_code));

    let key = ledger.track("task", subtype, &description, Some(merged));

    if exit_code == 0 {
        if let Some(failure) = find_unresolved_failure(ledger, task_name) {
            ledger.resolve(&failure);
            debug!(task = %task_name, "Task recovered from earlier failure");
        }
    }

    key
}

/// Finds the unresolved failure event for `task_name`, if one exists.
fn find_unresolved_failure<S: Storage>(
    ledger: &EventLedger<S>,
    task_name: &str,
) -> Option<EventKey> {
    ledger
        .events()
        .find(|event| {
            event.kind == "task"
                && event.subtype == "failure"
                && !event.is_resolved()
                && event.metadata.get("taskName").and_then(Value::as_str) == Some(task_name)
        })
        .map(Event::key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn ledger() -> EventLedger<MemoryStore> {
        EventLedger::new(MemoryStore::new())
    }

    #[test]
    fn success_and_failure_map_to_subtypes() {
        let mut ledger = ledger();

        let ok = track_task(&mut ledger, "build", 0, None);
        let bad = track_task(&mut ledger, "test", 101, None);

        assert_eq!(ok.subtype, "success");
        assert_eq!(ok.description, "Task \"build\" success");
        assert_eq!(bad.subtype, "failure");
        assert_eq!(bad.description, "Task \"test\" failure");
    }

    #[test]
    fn success_resolves_prior_failure_of_same_task() {
        let mut ledger = ledger();

        track_task(&mut ledger, "build", 1, None);
        track_task(&mut ledger, "build", 0, None);

        let stats = &ledger.summary().by_type["task"];
        assert_eq!(stats.total, 2);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.subtype_counts["failure"], 1);
        assert_eq!(stats.subtype_counts["success"], 1);
    }

    #[test]
    fn success_ignores_failures_of_other_tasks() {
        let mut ledger = ledger();

        track_task(&mut ledger, "test", 2, None);
        track_task(&mut ledger, "build", 0, None);

        assert_eq!(ledger.summary().by_type["task"].resolved, 0);
    }

    #[test]
    fn repeated_failures_deduplicate_onto_one_event() {
        let mut ledger = ledger();

        let first = track_task(&mut ledger, "build", 1, None);
        let second = track_task(&mut ledger, "build", 2, None);

        assert_eq!(first, second);
        let events = ledger.events_by_type("task");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].occurrence_count, 2);
        // Latest exit code wins in the merged metadata.
        assert_eq!(events[0].metadata["exitCode"], json!(2));
    }

    #[test]
    fn success_after_recovery_does_not_resolve_twice() {
        let mut ledger = ledger();

        track_task(&mut ledger, "build", 1, None);
        track_task(&mut ledger, "build", 0, None);
        track_task(&mut ledger, "build", 0, None);

        assert_eq!(ledger.summary().by_type["task"].resolved, 1);
    }

    #[test]
    fn caller_metadata_is_merged() {
        let mut ledger = ledger();
        let mut metadata = Map::new();
        metadata.insert("durationMs".to_string(), json!(1234));

        let key = track_task(&mut ledger, "lint", 0, Some(metadata));

        let events = ledger.events_by_type("task");
        assert_eq!(events[0].key(), key);
        assert_eq!(events[0].metadata["durationMs"], json!(1234));
        assert_eq!(events[0].metadata["taskName"], json!("lint"));
        assert_eq!(events[0].metadata["exitCode"], json!(0));
    }
}
