//! Windowed achievement aggregation.
//!
//! Condenses recent ledger activity into an [`ActivityReport`] the
//! presentation layer renders as celebratory output. Only the structured
//! data lives here; copywriting and rendering belong to the consumer.
//!
//! An achievement counts toward the window when the *celebratable moment*
//! fell inside it: a diagnostic counts when it was resolved recently, a
//! successful task or file operation when it happened recently. A fix
//! landing now on an issue first seen a week ago is still a fresh win.

use serde::Serialize;

use crate::ledger::{now_ms, EventLedger};
use crate::storage::Storage;

/// Default report window: one hour.
pub const DEFAULT_REPORT_WINDOW_MS: i64 = 60 * 60 * 1_000;

/// How impressive the recent activity is, from quiet to on-fire.
///
/// Drives the tone of whatever copy the presentation layer picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementLevel {
    Minimal,
    Low,
    Medium,
    High,
    Epic,
}

/// Diagnostics fixed within the window, by severity.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DiagnosticAchievements {
    pub total: u32,
    pub errors: u32,
    pub warnings: u32,
    pub hints: u32,
}

/// Task outcomes within the window.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TaskAchievements {
    /// Tasks that completed successfully within the window.
    pub successful: u32,
    /// Previously failing tasks whose failure resolved within the window.
    pub recovered: u32,
    pub total: u32,
}

/// File operations within the window.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FileAchievements {
    pub created: u32,
    pub changed: u32,
    pub renamed: u32,
    pub total: u32,
}

/// Structured summary of recent wins.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    /// Overall intensity of the recent activity.
    pub level: AchievementLevel,

    /// Human-readable description of the window ("the last 2 hours").
    pub time_description: String,

    pub diagnostics: DiagnosticAchievements,
    pub tasks: TaskAchievements,
    pub files: FileAchievements,

    /// Whether anything celebratable happened at all.
    pub has_achievements: bool,
}

/// Builds an [`ActivityReport`] over the trailing `window_ms` window.
///
/// # Example
///
/// ```
/// use kudos_tracker::ledger::EventLedger;
/// use kudos_tracker::report::{build_report, AchievementLevel, DEFAULT_REPORT_WINDOW_MS};
/// use kudos_tracker::storage::MemoryStore;
/// use kudos_tracker::trackers::track_task;
///
/// let mut ledger = EventLedger::new(MemoryStore::new());
/// track_task(&mut ledger, "build", 0, None);
///
/// let report = build_report(&ledger, DEFAULT_REPORT_WINDOW_MS);
/// assert!(report.has_achievements);
/// assert_eq!(report.level, AchievementLevel::Low);
/// assert_eq!(report.tasks.successful, 1);
/// ```
#[must_use]
pub fn build_report<S: Storage>(ledger: &EventLedger<S>, window_ms: i64) -> ActivityReport {
    build_report_at(ledger, now_ms(), window_ms)
}

pub(crate) fn build_report_at<S: Storage>(
    ledger: &EventLedger<S>,
    now: i64,
    window_ms: i64,
) -> ActivityReport {
    let cutoff = now - window_ms;
    let recent = ledger.query_at(now, window_ms);

    let mut diagnostics = DiagnosticAchievements::default();
    let mut tasks = TaskAchievements::default();
    let mut files = FileAchievements::default();

    for event in recent {
        let created_recently = event.timestamp >= cutoff;
        let resolved_recently = event
            .resolved_timestamp
            .is_some_and(|resolved| resolved >= cutoff);

        match event.kind.as_str() {
            "diagnostic" if resolved_recently => {
                diagnostics.total += 1;
                match event.subtype.as_str() {
                    "error" => diagnostics.errors += 1,
                    "warning" => diagnostics.warnings += 1,
                    "hint" => diagnostics.hints += 1,
                    _ => {}
                }
            }
            "task" => {
                if event.subtype == "success" && created_recently {
                    tasks.successful += 1;
                }
                if event.subtype == "failure" && resolved_recently {
                    tasks.recovered += 1;
                }
            }
            "file" if created_recently => match event.subtype.as_str() {
                "created" => files.created += 1,
                "changed" => files.changed += 1,
                "renamed" => files.renamed += 1,
                _ => {}
            },
            _ => {}
        }
    }

    tasks.total = tasks.successful + tasks.recovered;
    files.total = files.created + files.changed + files.renamed;

    let achievement_count = u32::from(diagnostics.total > 0)
        + u32::from(tasks.total > 0)
        + u32::from(files.created > 0)
        + u32::from(files.changed > 0);

    ActivityReport {
        level: achievement_level(diagnostics.total, achievement_count),
        time_description: time_description(window_ms),
        diagnostics,
        tasks,
        files,
        has_achievements: achievement_count > 0,
    }
}

/// Maps recent fix volume and breadth of activity to a level.
fn achievement_level(fixed_issues: u32, achievement_count: u32) -> AchievementLevel {
    if fixed_issues >= 10 {
        AchievementLevel::Epic
    } else if fixed_issues >= 5 {
        AchievementLevel::High
    } else if achievement_count >= 3 {
        AchievementLevel::Medium
    } else if achievement_count >= 1 {
        AchievementLevel::Low
    } else {
        AchievementLevel::Minimal
    }
}

/// Renders a window length as a trailing-interval phrase.
fn time_description(window_ms: i64) -> String {
    let minutes = window_ms / (60 * 1_000);
    let hours = window_ms / (60 * 60 * 1_000);
    let days = window_ms / (24 * 60 * 60 * 1_000);

    if days >= 1 {
        format!("the last {days} day{}", if days > 1 { "s" } else { "" })
    } else if hours >= 1 {
        format!("the last {hours} hour{}", if hours > 1 { "s" } else { "" })
    } else if minutes >= 1 {
        format!(
            "the last {minutes} minute{}",
            if minutes > 1 { "s" } else { "" }
        )
    } else {
        "the last few moments".to_string()
    }
}
