//! Snapshot diffing for diagnostic observation cycles.
//!
//! Given the previous and current [`Snapshot`] for the same resource, the
//! differ reports which issues disappeared (fixed) and which are new
//! (added). Downstream consumers use the result to drive celebrations and
//! ledger bookkeeping.
//!
//! # Position-collision suppression
//!
//! A disappeared issue is *not* reported as fixed when any current issue
//! starts at exactly the same `(line, column)`. An issue that merely changed
//! shape or message when the surrounding code was edited would otherwise
//! look like a fix. The trade-off is deliberate: a missed true fix is
//! acceptable, celebrating a non-fix is not. Matching only the start
//! position is a known heuristic limitation and preserved as-is.
//!
//! # Example
//!
//! ```
//! use kudos_tracker::differ::diff_snapshots;
//! use kudos_tracker::types::{IssueRecord, Severity, Snapshot};
//!
//! let unused = IssueRecord {
//!     severity: Severity::Warning,
//!     message: "unused variable `x`".to_string(),
//!     start_line: 3,
//!     start_column: 5,
//!     end_line: 3,
//!     end_column: 6,
//!     source: None,
//! };
//!
//! let previous = Snapshot::from_issues([unused]);
//! let current = Snapshot::new();
//!
//! let diff = diff_snapshots(&previous, &current);
//! assert_eq!(diff.fixed.len(), 1);
//! assert!(diff.added.is_empty());
//! ```

use std::collections::HashSet;

use crate::types::{IssueRecord, Snapshot};

/// Result of diffing two snapshots of the same resource.
///
/// Neither list carries an ordering guarantee; each issue appears at most
/// once per list.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDiff {
    /// Issues present previously that truly resolved.
    pub fixed: Vec<IssueRecord>,

    /// Issues present now that were not present before.
    pub added: Vec<IssueRecord>,
}

impl SnapshotDiff {
    /// Returns `true` if nothing was fixed and nothing was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty() && self.added.is_empty()
    }
}

/// Diffs `previous` against `current` for one resource.
///
/// Pure function over its two inputs: no failure modes, no validation of
/// the records themselves.
///
/// - An identity key present in `previous` but absent in `current` is a
///   fixed candidate, suppressed when any current issue shares its exact
///   start position (see the module docs).
/// - An identity key present in `current` but absent in `previous` is
///   reported as added, unconditionally.
#[must_use]
pub fn diff_snapshots(previous: &Snapshot, current: &Snapshot) -> SnapshotDiff {
    let current_starts: HashSet<(i32, i32)> =
        current.iter().map(IssueRecord::start_position).collect();

    let fixed = previous
        .iter()
        .filter(|issue| !current.contains_key(&issue.key()))
        .filter(|issue| !current_starts.contains(&issue.start_position()))
        .cloned()
        .collect();

    let added = current
        .iter()
        .filter(|issue| !previous.contains_key(&issue.key()))
        .cloned()
        .collect();

    SnapshotDiff { fixed, added }
}
