//! Diagnostic observation cycles: retain, diff, record.
//!
//! The host pushes the full current issue set for a resource every time its
//! diagnostics provider fires. [`DiagnosticTracker`] keeps the previous
//! [`Snapshot`] per resource, diffs it against the new one, and records the
//! outcome in the ledger: added issues become unresolved `diagnostic`
//! events, fixed issues become tracked-and-resolved events. The snapshot is
//! then replaced wholesale for the next cycle.
//!
//! # Example
//!
//! ```
//! use kudos_tracker::ledger::EventLedger;
//! use kudos_tracker::storage::MemoryStore;
//! use kudos_tracker::trackers::DiagnosticTracker;
//! use kudos_tracker::types::{IssueRecord, Severity, Snapshot};
//!
//! let mut ledger = EventLedger::new(MemoryStore::new());
//! let mut tracker = DiagnosticTracker::new();
//!
//! let issue = IssueRecord {
//!     severity: Severity::Error,
//!     message: "missing semicolon".to_string(),
//!     start_line: 12,
//!     start_column: 8,
//!     end_line: 12,
//!     end_column: 9,
//!     source: Some("rustc".to_string()),
//! };
//!
//! // First cycle: the issue appears.
//! let diff = tracker.observe(&mut ledger, "file:///src/main.rs", Snapshot::from_issues([issue]));
//! assert_eq!(diff.added.len(), 1);
//!
//! // Second cycle: the issue is gone, so it is recorded as resolved.
//! let diff = tracker.observe(&mut ledger, "file:///src/main.rs", Snapshot::new());
//! assert_eq!(diff.fixed.len(), 1);
//! assert_eq!(ledger.summary().by_type["diagnostic"].resolved, 1);
//! ```

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::differ::{diff_snapshots, SnapshotDiff};
use crate::ledger::EventLedger;
use crate::storage::Storage;
use crate::trackers::basename;
use crate::types::{IssueRecord, Snapshot};

/// Retains the last observed snapshot per resource and feeds diffs into the
/// ledger.
///
/// One instance serves all resources; the host owns it for the lifetime of
/// the extension session.
#[derive(Debug, Default)]
pub struct DiagnosticTracker {
    /// Previous snapshot per resource, retained only for the next diff.
    previous: HashMap<String, Snapshot>,
}

impl DiagnosticTracker {
    /// Creates a tracker with no retained snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one observation cycle for `resource`.
    ///
    /// Diffs the retained previous snapshot (empty on first observation)
    /// against `current`, records added issues as unresolved `diagnostic`
    /// events and fixed issues as resolved ones, then retains `current` for
    /// the next cycle. Returns the diff for the presentation layer.
    pub fn observe<S: Storage>(
        &mut self,
        ledger: &mut EventLedger<S>,
        resource: &str,
        current: Snapshot,
    ) -> SnapshotDiff {
        let previous = self.previous.remove(resource).unwrap_or_default();
        let diff = diff_snapshots(&previous, &current);

        trace!(
            resource = %resource,
            previous = previous.len(),
            current = current.len(),
            fixed = diff.fixed.len(),
            added = diff.added.len(),
            "Observed diagnostics"
        );

        for issue in &diff.added {
            record_issue(ledger, resource, issue, false);
        }
        for issue in &diff.fixed {
            record_issue(ledger, resource, issue, true);
        }

        if !diff.fixed.is_empty() {
            debug!(
                resource = %resource,
                fixed = diff.fixed.len(),
                "Issues resolved"
            );
        }

        self.previous.insert(resource.to_string(), current);
        diff
    }

    /// Drops the retained snapshot for `resource`.
    ///
    /// Call when the host closes a resource; issues disappearing because a
    /// file was closed must not look like fixes on a later reopen.
    pub fn forget(&mut self, resource: &str) {
        if self.previous.remove(resource).is_some() {
            trace!(resource = %resource, "Dropped retained snapshot");
        }
    }

    /// Returns the number of resources with a retained snapshot.
    #[must_use]
    pub fn tracked_resources(&self) -> usize {
        self.previous.len()
    }
}

/// Records one issue in the ledger, optionally resolving it immediately.
fn record_issue<S: Storage>(
    ledger: &mut EventLedger<S>,
    resource: &str,
    issue: &IssueRecord,
    resolved: bool,
) {
    let severity = issue.severity.as_str();
    let description = format!(
        "{severity} in {}: {}",
        basename(resource),
        issue.message
    );

    let mut metadata = Map::new();
    metadata.insert("uri".to_string(), Value::from(resource));
    metadata.insert("severity".to_string(), Value::from(severity));
    if let Some(source) = &issue.source {
        metadata.insert("source".to_string(), Value::from(source.clone()));
    }
    metadata.insert("line".to_string(), Value::from(issue.start_line));
    metadata.insert("character".to_string(), Value::from(issue.start_column));

    let key = ledger.track("diagnostic", severity, &description, Some(metadata));
    if resolved {
        ledger.resolve(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::Severity;

    fn issue(severity: Severity, message: &str, line: i32, column: i32) -> IssueRecord {
        IssueRecord {
            severity,
            message: message.to_string(),
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: column + 1,
            source: Some("rustc".to_string()),
        }
    }

    #[test]
    fn first_observation_records_all_issues_as_added() {
        let mut ledger = EventLedger::new(MemoryStore::new());
        let mut tracker = DiagnosticTracker::new();

        let diff = tracker.observe(
            &mut ledger,
            "file:///src/main.rs",
            Snapshot::from_issues([
                issue(Severity::Error, "oops", 1, 1),
                issue(Severity::Warning, "hmm", 2, 2),
            ]),
        );

        assert!(diff.fixed.is_empty());
        assert_eq!(diff.added.len(), 2);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.unresolved_events().len(), 2);
    }

    #[test]
    fn cleared_resource_resolves_its_events() {
        let mut ledger = EventLedger::new(MemoryStore::new());
        let mut tracker = DiagnosticTracker::new();

        tracker.observe(
            &mut ledger,
            "file:///src/main.rs",
            Snapshot::from_issues([issue(Severity::Error, "unused var", 3, 5)]),
        );
        let diff = tracker.observe(&mut ledger, "file:///src/main.rs", Snapshot::new());

        assert_eq!(diff.fixed.len(), 1);
        let stats = &ledger.summary().by_type["diagnostic"];
        assert_eq!(stats.total, 1);
        assert_eq!(stats.resolved, 1);
        // Tracked once on add, once more on resolution.
        assert_eq!(ledger.events_by_type("diagnostic")[0].occurrence_count, 2);
    }

    #[test]
    fn position_collision_keeps_event_unresolved() {
        let mut ledger = EventLedger::new(MemoryStore::new());
        let mut tracker = DiagnosticTracker::new();
        let uri = "file:///src/lib.rs";

        tracker.observe(
            &mut ledger,
            uri,
            Snapshot::from_issues([issue(Severity::Error, "unused var", 3, 5)]),
        );
        let diff = tracker.observe(
            &mut ledger,
            uri,
            Snapshot::from_issues([issue(Severity::Error, "different error", 3, 5)]),
        );

        assert!(diff.fixed.is_empty());
        assert_eq!(diff.added.len(), 1);
        let stats = &ledger.summary().by_type["diagnostic"];
        assert_eq!(stats.total, 2);
        assert_eq!(stats.resolved, 0);
    }

    #[test]
    fn resources_are_tracked_independently() {
        let mut ledger = EventLedger::new(MemoryStore::new());
        let mut tracker = DiagnosticTracker::new();

        tracker.observe(
            &mut ledger,
            "file:///a.rs",
            Snapshot::from_issues([issue(Severity::Error, "oops", 1, 1)]),
        );
        // Same issue content in a different resource: no fix, fresh add.
        let diff = tracker.observe(
            &mut ledger,
            "file:///b.rs",
            Snapshot::from_issues([issue(Severity::Error, "oops", 1, 1)]),
        );

        assert!(diff.fixed.is_empty());
        assert_eq!(diff.added.len(), 1);
        assert_eq!(tracker.tracked_resources(), 2);
    }

    #[test]
    fn event_description_and_metadata_shape() {
        let mut ledger = EventLedger::new(MemoryStore::new());
        let mut tracker = DiagnosticTracker::new();

        tracker.observe(
            &mut ledger,
            "file:///home/dev/project/main.rs",
            Snapshot::from_issues([issue(Severity::Warning, "unused import", 7, 0)]),
        );

        let events = ledger.events_by_type("diagnostic");
        assert_eq!(events.len(), 1);
        let event = events[0];
        assert_eq!(event.subtype, "warning");
        assert_eq!(event.description, "warning in main.rs: unused import");
        assert_eq!(
            event.metadata["uri"],
            "file:///home/dev/project/main.rs"
        );
        assert_eq!(event.metadata["source"], "rustc");
        assert_eq!(event.metadata["line"], 7);
        assert_eq!(event.metadata["character"], 0);
    }

    #[test]
    fn forget_prevents_false_fixes_on_reopen() {
        let mut ledger = EventLedger::new(MemoryStore::new());
        let mut tracker = DiagnosticTracker::new();
        let uri = "file:///src/main.rs";

        tracker.observe(
            &mut ledger,
            uri,
            Snapshot::from_issues([issue(Severity::Error, "oops", 1, 1)]),
        );
        tracker.forget(uri);

        // Reopen with no issues: nothing retained, nothing to fix.
        let diff = tracker.observe(&mut ledger, uri, Snapshot::new());
        assert!(diff.is_empty());
        assert_eq!(ledger.summary().by_type["diagnostic"].resolved, 0);
    }
}
