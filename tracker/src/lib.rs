//! Kudos Tracker - the data core behind fix celebrations.
//!
//! This crate tracks what a developer just accomplished so that a
//! presentation layer (an editor extension, an overlay) can celebrate it.
//! It has two cooperating pieces:
//!
//! - The **snapshot differ** compares consecutive diagnostic snapshots for
//!   a resource and reports which issues truly resolved and which are new,
//!   with a position heuristic that refuses to celebrate an issue that
//!   merely changed shape.
//! - The **event ledger** keeps the durable, deduplicated record of tracked
//!   occurrences (diagnostics, task runs, file operations) with first-seen
//!   and resolved timestamps, answers windowed "what happened recently"
//!   queries, and persists itself through an injected key-value store.
//!
//! Everything is synchronous and single-threaded: the host invokes one
//! operation per editor callback, and each completes in microseconds on
//! realistic event counts. Rendering, window effects, and motivational copy
//! live entirely outside this crate.
//!
//! # Modules
//!
//! - [`types`]: shared data model (issues, snapshots, events)
//! - [`differ`]: snapshot diffing with position-collision suppression
//! - [`ledger`]: the event ledger and its summary statistics
//! - [`storage`]: the key-value persistence boundary
//! - [`trackers`]: host-facing glue for diagnostics, tasks, and files
//! - [`report`]: windowed achievement aggregation
//! - [`error`]: error types

pub mod differ;
pub mod error;
pub mod ledger;
pub mod report;
pub mod storage;
pub mod trackers;
pub mod types;

pub use differ::{diff_snapshots, SnapshotDiff};
pub use error::{LedgerError, Result, StorageError};
pub use ledger::{EventLedger, LedgerSummary, TypeStats};
pub use report::{build_report, AchievementLevel, ActivityReport, DEFAULT_REPORT_WINDOW_MS};
pub use storage::{JsonFileStore, MemoryStore, Storage};
pub use trackers::DiagnosticTracker;
pub use types::{Event, EventKey, IssueKey, IssueRecord, Severity, Snapshot};
