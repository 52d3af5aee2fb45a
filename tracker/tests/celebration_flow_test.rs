//! End-to-end flow: editor signals in, celebration data out.
//!
//! Drives the differ, ledger, trackers, and report together the way a host
//! extension would across a short working session.

use kudos_tracker::ledger::EventLedger;
use kudos_tracker::report::{build_report, AchievementLevel, DEFAULT_REPORT_WINDOW_MS};
use kudos_tracker::storage::MemoryStore;
use kudos_tracker::trackers::{track_file_changed, track_file_created, track_task, DiagnosticTracker};
use kudos_tracker::types::{IssueRecord, Severity, Snapshot};

// ============================================================================
// Helper Functions
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("kudos_tracker=debug")
        .try_init();
}

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

// ============================================================================
// Full Session Flow
// ============================================================================

#[test]
fn a_working_session_produces_a_celebratable_report() {
    init_tracing();
    let mut ledger = EventLedger::new(MemoryStore::new());
    let mut diagnostics = DiagnosticTracker::new();
    let uri = "file:///home/dev/project/src/main.rs";

    // The build fails and two diagnostics appear.
    track_task(&mut ledger, "cargo build", 101, None);
    let diff = diagnostics.observe(
        &mut ledger,
        uri,
        Snapshot::from_issues([
            issue(Severity::Error, "mismatched types", 14, 9),
            issue(Severity::Warning, "unused variable `total`", 20, 13),
        ]),
    );
    assert_eq!(diff.added.len(), 2);

    // The developer edits, saves, and both diagnostics clear.
    track_file_changed(&mut ledger, uri);
    let diff = diagnostics.observe(&mut ledger, uri, Snapshot::new());
    assert_eq!(diff.fixed.len(), 2);
    assert!(diff.added.is_empty());

    // The build succeeds, recovering the earlier failure.
    track_task(&mut ledger, "cargo build", 0, None);

    // A new module gets created along the way.
    track_file_created(&mut ledger, "file:///home/dev/project/src/report.rs");

    let summary = ledger.summary();
    assert_eq!(summary.by_type["diagnostic"].resolved, 2);
    assert_eq!(summary.by_type["task"].resolved, 1);
    assert_eq!(summary.by_type["task"].subtype_counts["failure"], 1);
    assert_eq!(summary.by_type["file"].unresolved, 2);

    // Everything above happened just now, so the hour window sees it all.
    let recent = ledger.query(DEFAULT_REPORT_WINDOW_MS);
    assert_eq!(recent.len(), ledger.len());

    let report = build_report(&ledger, DEFAULT_REPORT_WINDOW_MS);
    assert!(report.has_achievements);
    assert_eq!(report.diagnostics.total, 2);
    assert_eq!(report.diagnostics.errors, 1);
    assert_eq!(report.diagnostics.warnings, 1);
    assert_eq!(report.tasks.successful, 1);
    assert_eq!(report.tasks.recovered, 1);
    assert_eq!(report.files.created, 1);
    assert_eq!(report.files.changed, 1);
    assert_eq!(report.time_description, "the last 1 hour");
    // Fixes + tasks + created + changed: four groups, still under five fixes.
    assert_eq!(report.level, AchievementLevel::Medium);
}

#[test]
fn an_issue_that_changes_shape_is_not_celebrated() {
    init_tracing();
    let mut ledger = EventLedger::new(MemoryStore::new());
    let mut diagnostics = DiagnosticTracker::new();
    let uri = "file:///home/dev/project/src/lib.rs";

    diagnostics.observe(
        &mut ledger,
        uri,
        Snapshot::from_issues([issue(Severity::Error, "unused var", 3, 5)]),
    );
    let diff = diagnostics.observe(
        &mut ledger,
        uri,
        Snapshot::from_issues([issue(Severity::Error, "cannot find value `x`", 3, 5)]),
    );

    assert!(diff.fixed.is_empty());
    assert_eq!(diff.added.len(), 1);

    let report = build_report(&ledger, DEFAULT_REPORT_WINDOW_MS);
    assert_eq!(report.diagnostics.total, 0);
    assert!(!report.has_achievements);
}

#[test]
fn export_snapshot_of_a_session_parses_back() {
    init_tracing();
    let mut ledger = EventLedger::new(MemoryStore::new());

    track_task(&mut ledger, "cargo test", 0, None);
    let key = ledger.track("diagnostic", "error", "error in a.rs: oops", None);
    ledger.resolve(&key);

    let exported = ledger.export().expect("Failed to export ledger");
    let doc: serde_json::Value = serde_json::from_str(&exported).expect("Export is not JSON");

    assert_eq!(doc["events"].as_array().unwrap().len(), 2);
    assert_eq!(doc["summary"]["totalEvents"], 2);
    assert_eq!(doc["summary"]["byType"]["diagnostic"]["resolved"], 1);
    assert!(doc["summary"]["sessionStartTime"].is_i64());
}
