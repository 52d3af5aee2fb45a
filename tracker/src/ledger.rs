//! The event ledger: durable record of tracked occurrences.
//!
//! [`EventLedger`] owns every [`Event`] for a session, deduplicated by
//! [`EventKey`]. It is synchronous, single-threaded, and mutated strictly
//! in response to discrete host callbacks (a diagnostics change, a task
//! ending, a file operation); there are no internal suspension points.
//!
//! # Persistence
//!
//! The full event list and the session-start timestamp are written to the
//! injected [`Storage`] under two fixed keys after every mutating call and
//! reloaded at construction. Routine writes are best-effort: a failing
//! store logs a warning and never interrupts tracking. Hosts that need a
//! hard guarantee at shutdown call [`flush`](EventLedger::flush).
//!
//! # Example
//!
//! ```
//! use kudos_tracker::ledger::EventLedger;
//! use kudos_tracker::storage::MemoryStore;
//!
//! let mut ledger = EventLedger::new(MemoryStore::new());
//!
//! let key = ledger.track("diagnostic", "error", "error in main.rs: oops", None);
//! assert!(ledger.resolve(&key));
//! assert!(!ledger.resolve(&key)); // one-way transition, second call is a no-op
//!
//! let summary = ledger.summary();
//! assert_eq!(summary.by_type["diagnostic"].resolved, 1);
//! ```

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::storage::Storage;
use crate::types::{Event, EventKey};

/// Storage key for the persisted event list.
const EVENTS_KEY: &str = "ledger.events";

/// Storage key for the persisted session-start timestamp.
const SESSION_START_KEY: &str = "ledger.sessionStart";

/// Current time in epoch milliseconds.
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Per-kind statistics in a [`LedgerSummary`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStats {
    /// Total events of this kind.
    pub total: u32,

    /// Events that have reached the resolved state.
    pub resolved: u32,

    /// Events still unresolved.
    pub unresolved: u32,

    /// Event counts per subtype.
    pub subtype_counts: HashMap<String, u32>,

    /// Mean of `resolved_timestamp - timestamp` over resolved events of
    /// this kind, in milliseconds. `None` when nothing has resolved yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_resolution_time: Option<f64>,
}

/// Aggregate statistics over the whole ledger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    /// Statistics per event kind.
    pub by_type: HashMap<String, TypeStats>,

    /// Total events across all kinds.
    pub total_events: u32,

    /// When the session started. Epoch milliseconds.
    pub session_start_time: i64,

    /// When this summary was computed. Epoch milliseconds.
    pub last_update_time: i64,
}

/// Durable record of tracked occurrences with windowed queries.
///
/// Constructed by the host on activation with an injected store and dropped
/// (after [`flush`](Self::flush)) on deactivation. See the module docs for
/// the persistence contract.
#[derive(Debug)]
pub struct EventLedger<S: Storage> {
    /// Live events, at most one per identity key.
    events: HashMap<EventKey, Event>,

    /// When this session started. Epoch milliseconds.
    session_start: i64,

    /// Injected persistence collaborator.
    storage: S,
}

impl<S: Storage> EventLedger<S> {
    /// Creates a ledger backed by `storage`, reloading any persisted state.
    ///
    /// Unreadable or undecodable persisted state is logged and discarded;
    /// the ledger then starts empty with a fresh session-start timestamp.
    pub fn new(storage: S) -> Self {
        let mut ledger = Self {
            events: HashMap::new(),
            session_start: now_ms(),
            storage,
        };
        ledger.load();
        ledger
    }

    /// Tracks an occurrence, creating or updating the event for its key.
    ///
    /// A first observation creates the event with `occurrence_count = 1`.
    /// A repeat observation increments the count, refreshes the timestamp,
    /// and merges `metadata` (new keys overwrite old on conflict). The
    /// resolution state is never touched: tracking an already-resolved
    /// event bumps its count but does not reopen it.
    ///
    /// Returns the identity key, which doubles as the handle for
    /// [`resolve`](Self::resolve).
    pub fn track(
        &mut self,
        kind: &str,
        subtype: &str,
        description: &str,
        metadata: Option<Map<String, Value>>,
    ) -> EventKey {
        let now = now_ms();
        self.track_at(now, kind, subtype, description, metadata)
    }

    pub(crate) fn track_at(
        &mut self,
        now: i64,
        kind: &str,
        subtype: &str,
        description: &str,
        metadata: Option<Map<String, Value>>,
    ) -> EventKey {
        let key = EventKey::new(kind, subtype, description);

        match self.events.get_mut(&key) {
            Some(event) => {
                event.occurrence_count += 1;
                event.timestamp = now;
                if let Some(metadata) = metadata {
                    for (name, value) in metadata {
                        event.metadata.insert(name, value);
                    }
                }
                debug!(
                    id = %event.id,
                    occurrence_count = event.occurrence_count,
                    "Updated tracked event"
                );
            }
            None => {
                let event = Event {
                    id: key.composite_id(),
                    kind: key.kind.clone(),
                    subtype: key.subtype.clone(),
                    description: key.description.clone(),
                    timestamp: now,
                    resolved_timestamp: None,
                    occurrence_count: 1,
                    metadata: metadata.unwrap_or_default(),
                };
                debug!(id = %event.id, "Tracked new event");
                self.events.insert(key.clone(), event);
            }
        }

        self.persist();
        key
    }

    /// Marks the event under `key` as resolved.
    ///
    /// Returns `true` only when a transition actually occurred: the event
    /// exists and was unresolved. Resolving twice is safe; the second call
    /// returns `false` and leaves the original resolution timestamp intact.
    /// An unknown key is a no-op returning `false`, not an error.
    pub fn resolve(&mut self, key: &EventKey) -> bool {
        self.resolve_at(now_ms(), key)
    }

    pub(crate) fn resolve_at(&mut self, now: i64, key: &EventKey) -> bool {
        match self.events.get_mut(key) {
            Some(event) if !event.is_resolved() => {
                event.resolved_timestamp = Some(now);
                debug!(id = %event.id, "Resolved event");
                self.persist();
                true
            }
            Some(event) => {
                trace!(id = %event.id, "Resolve on already-resolved event");
                false
            }
            None => {
                trace!(id = %key.composite_id(), "Resolve on unknown event");
                false
            }
        }
    }

    /// Returns every event touched within the trailing `window_ms` window.
    ///
    /// An event qualifies when it was *created* recently (`timestamp` within
    /// the window) or *resolved* recently (`resolved_timestamp` within the
    /// window), or both. A fix happening now on an issue first seen a week
    /// ago therefore still appears in a one-hour window.
    #[must_use]
    pub fn query(&self, window_ms: i64) -> Vec<&Event> {
        self.query_at(now_ms(), window_ms)
    }

    pub(crate) fn query_at(&self, now: i64, window_ms: i64) -> Vec<&Event> {
        let cutoff = now - window_ms;
        self.events
            .values()
            .filter(|event| {
                event.timestamp >= cutoff
                    || event
                        .resolved_timestamp
                        .is_some_and(|resolved| resolved >= cutoff)
            })
            .collect()
    }

    /// Computes aggregate statistics over the whole ledger.
    #[must_use]
    pub fn summary(&self) -> LedgerSummary {
        self.summary_at(now_ms())
    }

    pub(crate) fn summary_at(&self, now: i64) -> LedgerSummary {
        let mut by_type: HashMap<String, TypeStats> = HashMap::new();

        for event in self.events.values() {
            let stats = by_type.entry(event.kind.clone()).or_default();
            stats.total += 1;
            if event.is_resolved() {
                stats.resolved += 1;
            } else {
                stats.unresolved += 1;
            }
            *stats.subtype_counts.entry(event.subtype.clone()).or_insert(0) += 1;
        }

        for (kind, stats) in &mut by_type {
            let durations: Vec<i64> = self
                .events
                .values()
                .filter(|event| &event.kind == kind)
                .filter_map(|event| {
                    event
                        .resolved_timestamp
                        .map(|resolved| resolved - event.timestamp)
                })
                .collect();

            if !durations.is_empty() {
                stats.average_resolution_time =
                    Some(durations.iter().sum::<i64>() as f64 / durations.len() as f64);
            }
        }

        LedgerSummary {
            total_events: self.events.len() as u32,
            by_type,
            session_start_time: self.session_start,
            last_update_time: now,
        }
    }

    /// Iterates over all events in no particular order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    /// Returns all events of the given kind.
    #[must_use]
    pub fn events_by_type(&self, kind: &str) -> Vec<&Event> {
        self.events
            .values()
            .filter(|event| event.kind == kind)
            .collect()
    }

    /// Returns all events that have not been resolved.
    #[must_use]
    pub fn unresolved_events(&self) -> Vec<&Event> {
        self.events
            .values()
            .filter(|event| !event.is_resolved())
            .collect()
    }

    /// Returns the number of live events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the session-start timestamp in epoch milliseconds.
    #[must_use]
    pub fn session_start(&self) -> i64 {
        self.session_start
    }

    /// Drops every event and restarts the session clock.
    pub fn clear(&mut self) {
        self.events.clear();
        self.session_start = now_ms();
        debug!("Cleared ledger");
        self.persist();
    }

    /// Exports all events and the current summary as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export(&self) -> Result<String> {
        let doc = serde_json::json!({
            "events": self.sorted_events(),
            "summary": self.summary(),
        });
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Writes the current state to storage, surfacing any failure.
    ///
    /// Intended for host deactivation, where a silent best-effort write is
    /// not enough.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn flush(&mut self) -> Result<()> {
        self.write_state()
    }

    /// Events sorted by timestamp then id, for stable persisted output.
    fn sorted_events(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events.values().collect();
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        events
    }

    /// Best-effort persistence after a mutation.
    fn persist(&mut self) {
        if let Err(e) = self.write_state() {
            warn!(error = %e, "Failed to persist ledger state");
        }
    }

    fn write_state(&mut self) -> Result<()> {
        let value = serde_json::to_value(self.sorted_events())?;
        self.storage.set(EVENTS_KEY, value)?;
        self.storage
            .set(SESSION_START_KEY, Value::from(self.session_start))?;
        Ok(())
    }

    fn load(&mut self) {
        match self.storage.get(EVENTS_KEY) {
            Ok(Some(value)) => match serde_json::from_value::<Vec<Event>>(value) {
                Ok(events) => {
                    for event in events {
                        self.events.insert(event.key(), event);
                    }
                    debug!(events = self.events.len(), "Restored persisted events");
                }
                Err(e) => warn!(error = %e, "Discarding undecodable persisted events"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read persisted events"),
        }

        match self.storage.get(SESSION_START_KEY) {
            Ok(Some(value)) => {
                if let Some(ms) = value.as_i64() {
                    self.session_start = ms;
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read persisted session start"),
        }
    }
}
