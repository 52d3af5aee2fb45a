//! Host-facing tracking glue for the event ledger.
//!
//! The host's extension process wires its editor callbacks to these
//! helpers, which translate raw signals into ledger events:
//!
//! - [`diagnostics`]: per-resource snapshot retention and the
//!   observe-diff-record cycle
//! - [`tasks`]: task runs with failure-recovery resolution
//! - [`files`]: file created/changed/renamed events
//!
//! Descriptions and metadata follow a fixed shape per kind so that repeat
//! observations of the same occurrence deduplicate onto one event.

pub mod diagnostics;
pub mod files;
pub mod tasks;

pub use diagnostics::DiagnosticTracker;
pub use files::{track_file_changed, track_file_created, track_file_renamed};
pub use tasks::track_task;

/// Returns the last path segment of a resource identifier.
///
/// Handles both `/` and `\` separators. Falls back to the full input when
/// the last segment is empty (e.g. a trailing slash).
pub(crate) fn basename(path: &str) -> &str {
    match path.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() => name,
        _ => path,
    }
}
