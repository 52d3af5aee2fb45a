//! Shared data model for the Kudos tracker.
//!
//! This module defines the types flowing between the host (an editor
//! extension process), the snapshot differ, and the event ledger:
//!
//! - [`IssueRecord`] / [`IssueKey`] / [`Snapshot`]: one observed diagnostic,
//!   its identity, and the full set of diagnostics for one resource at one
//!   point in time.
//! - [`Event`] / [`EventKey`]: a tracked occurrence (diagnostic, task run,
//!   file operation) with creation/resolution timestamps.
//!
//! All timestamps are epoch milliseconds (`i64`). Persisted types serialize
//! to camelCase JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity of a diagnostic issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Returns the lowercase name used as an event subtype.
    ///
    /// # Example
    ///
    /// ```
    /// use kudos_tracker::types::Severity;
    ///
    /// assert_eq!(Severity::Error.as_str(), "error");
    /// assert_eq!(Severity::Hint.as_str(), "hint");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

/// One diagnostic issue at a specific location in a resource.
///
/// Produced by an external diagnostics provider and immutable once observed
/// in a snapshot. Positions carry whatever the provider reported; no
/// semantic validation is performed on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    /// Severity reported by the provider.
    pub severity: Severity,

    /// Human-readable diagnostic message.
    pub message: String,

    /// Start line of the issue range.
    pub start_line: i32,

    /// Start column of the issue range.
    pub start_column: i32,

    /// End line of the issue range.
    pub end_line: i32,

    /// End column of the issue range.
    pub end_column: i32,

    /// Tool that produced the diagnostic, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl IssueRecord {
    /// Returns the identity key for this issue.
    ///
    /// Identity covers severity, message, and the full range. The `source`
    /// field is informational and excluded.
    #[must_use]
    pub fn key(&self) -> IssueKey {
        IssueKey {
            severity: self.severity,
            message: self.message.clone(),
            start_line: self.start_line,
            start_column: self.start_column,
            end_line: self.end_line,
            end_column: self.end_column,
        }
    }

    /// Returns the `(line, column)` start position of the issue.
    #[must_use]
    pub fn start_position(&self) -> (i32, i32) {
        (self.start_line, self.start_column)
    }
}

/// Identity key for an [`IssueRecord`].
///
/// A dedicated struct key rather than a delimiter-joined string, so that
/// delimiter characters inside `message` can never collide two distinct
/// issues.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueKey {
    pub severity: Severity,
    pub message: String,
    pub start_line: i32,
    pub start_column: i32,
    pub end_line: i32,
    pub end_column: i32,
}

/// The complete set of issues observed for one resource at one point in time.
///
/// Snapshots are replaced wholesale each observation cycle; the previous
/// snapshot is retained only to diff against the next one.
///
/// # Example
///
/// ```
/// use kudos_tracker::types::{IssueRecord, Severity, Snapshot};
///
/// let snapshot = Snapshot::from_issues([IssueRecord {
///     severity: Severity::Warning,
///     message: "unused variable `x`".to_string(),
///     start_line: 3,
///     start_column: 5,
///     end_line: 3,
///     end_column: 6,
///     source: Some("rustc".to_string()),
/// }]);
///
/// assert_eq!(snapshot.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    issues: HashMap<IssueKey, IssueRecord>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from an iterator of issues.
    ///
    /// Issues sharing the same identity key collapse into one entry; the
    /// last one wins.
    #[must_use]
    pub fn from_issues<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = IssueRecord>,
    {
        let mut snapshot = Self::new();
        for issue in issues {
            snapshot.insert(issue);
        }
        snapshot
    }

    /// Inserts an issue, replacing any existing entry with the same key.
    pub fn insert(&mut self, issue: IssueRecord) {
        self.issues.insert(issue.key(), issue);
    }

    /// Returns the issue stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &IssueKey) -> Option<&IssueRecord> {
        self.issues.get(key)
    }

    /// Returns `true` if an issue with this identity key is present.
    #[must_use]
    pub fn contains_key(&self, key: &IssueKey) -> bool {
        self.issues.contains_key(key)
    }

    /// Iterates over the issues in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &IssueRecord> {
        self.issues.values()
    }

    /// Returns the number of distinct issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns `true` if the snapshot holds no issues.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Identity key for an [`Event`].
///
/// Like [`IssueKey`], this is a struct key with derived equality and
/// hashing; the legacy `type:subtype:description` string form survives only
/// as a display id via [`composite_id`](Self::composite_id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    /// Event type (`diagnostic`, `task`, `file`, ...).
    pub kind: String,
    /// Subtype within the kind (`error`, `success`, `created`, ...).
    pub subtype: String,
    /// Human-readable description; part of identity for deduplication.
    pub description: String,
}

impl EventKey {
    /// Creates a key from its three components.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        subtype: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            subtype: subtype.into(),
            description: description.into(),
        }
    }

    /// Renders the composite display id (`kind:subtype:description`).
    ///
    /// Used for logging and as the persisted `id` field; never used for
    /// lookups, so delimiter characters in the description are harmless.
    #[must_use]
    pub fn composite_id(&self) -> String {
        format!("{}:{}:{}", self.kind, self.subtype, self.description)
    }
}

/// A tracked occurrence with creation and resolution timestamps.
///
/// Events are owned exclusively by the [`EventLedger`](crate::EventLedger).
/// At most one live event exists per [`EventKey`]; repeat observations bump
/// [`occurrence_count`](Self::occurrence_count) instead of creating a new
/// entry. Resolution is a one-way transition: once
/// [`resolved_timestamp`](Self::resolved_timestamp) is set it is never
/// cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Composite display id (`kind:subtype:description`).
    pub id: String,

    /// Event type.
    #[serde(rename = "type")]
    pub kind: String,

    /// Subtype within the kind.
    pub subtype: String,

    /// Human-readable description.
    pub description: String,

    /// When the event was first observed, refreshed on repeat observation.
    /// Epoch milliseconds.
    pub timestamp: i64,

    /// When the event was resolved, if it has been. Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_timestamp: Option<i64>,

    /// How many times this same occurrence has been observed.
    pub occurrence_count: u32,

    /// Additional data specific to the event type.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Event {
    /// Returns the identity key this event is stored under.
    #[must_use]
    pub fn key(&self) -> EventKey {
        EventKey {
            kind: self.kind.clone(),
            subtype: self.subtype.clone(),
            description: self.description.clone(),
        }
    }

    /// Returns `true` if the event has reached its terminal resolved state.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved_timestamp.is_some()
    }
}
