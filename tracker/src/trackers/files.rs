//! File operation tracking.
//!
//! Thin translators from file-system signals (save, create, rename) into
//! `file` events. Descriptions use the file basename; full identifiers go
//! into metadata.

use serde_json::{Map, Value};

use crate::ledger::EventLedger;
use crate::storage::Storage;
use crate::trackers::basename;
use crate::types::EventKey;

/// Records a file creation. Returns the key of the tracked event.
pub fn track_file_created<S: Storage>(ledger: &mut EventLedger<S>, path: &str) -> EventKey {
    let name = basename(path);
    let mut metadata = Map::new();
    metadata.insert("uri".to_string(), Value::from(path));
    metadata.insert("fileName".to_string(), Value::from(name));

    ledger.track("file", "created", &format!("Created {name}"), Some(metadata))
}

/// Records a file change (save). Returns the key of the tracked event.
pub fn track_file_changed<S: Storage>(ledger: &mut EventLedger<S>, path: &str) -> EventKey {
    let name = basename(path);
    let mut metadata = Map::new();
    metadata.insert("uri".to_string(), Value::from(path));
    metadata.insert("fileName".to_string(), Value::from(name));

    ledger.track("file", "changed", &format!("Changed {name}"), Some(metadata))
}

/// Records a file rename. Returns the key of the tracked event.
pub fn track_file_renamed<S: Storage>(
    ledger: &mut EventLedger<S>,
    old_path: &str,
    new_path: &str,
) -> EventKey {
    let old_name = basename(old_path);
    let new_name = basename(new_path);

    let mut metadata = Map::new();
    metadata.insert("oldUri".to_string(), Value::from(old_path));
    metadata.insert("newUri".to_string(), Value::from(new_path));
    metadata.insert("oldName".to_string(), Value::from(old_name));
    metadata.insert("newName".to_string(), Value::from(new_name));

    ledger.track(
        "file",
        "renamed",
        &format!("Renamed {old_name} to {new_name}"),
        Some(metadata),
    )
}
