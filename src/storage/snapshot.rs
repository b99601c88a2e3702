//! Open-tab snapshot codec.
//!
//! The whole tab set is saved under one key so a restart can reopen it. A
//! snapshot older than the staleness window, or one that fails to decode, is
//! treated as absent.

use super::KvStore;
use crate::error::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Object store for application state blobs.
pub const STATE_STORE: &str = "state";

/// Key of the open-tab snapshot inside [`STATE_STORE`].
pub const SNAPSHOT_KEY: &str = "autosave";

/// Default staleness window.
pub const DEFAULT_MAX_AGE_HOURS: u32 = 24;

/// One open tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotTab {
    pub id: String,
    pub file_name: String,
    pub content: String,
    pub is_new: bool,
}

/// Saved tab set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tabs: Vec<SnapshotTab>,
    pub active_tab_id: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Snapshot {
    /// Whether the snapshot is older than `max_age_hours` at `now`.
    pub fn is_stale(&self, now: i64, max_age_hours: u32) -> bool {
        let max_age_ms = i64::from(max_age_hours) * 60 * 60 * 1000;
        now.saturating_sub(self.timestamp) > max_age_ms
    }
}

/// Write the snapshot, replacing any previous one.
pub fn save_snapshot(store: &mut dyn KvStore, snapshot: &Snapshot) -> Result<()> {
    let value = serde_json::to_value(snapshot)?;
    store.put(STATE_STORE, SNAPSHOT_KEY, value, &[])?;
    debug!("Saved snapshot with {} tab(s)", snapshot.tabs.len());
    Ok(())
}

/// Read a usable snapshot.
///
/// Missing, malformed and stale snapshots all yield `None`; the latter two
/// are logged.
pub fn load_snapshot(store: &dyn KvStore, now: i64, max_age_hours: u32) -> Option<Snapshot> {
    let value = match store.get(STATE_STORE, SNAPSHOT_KEY) {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read snapshot: {}", e);
            return None;
        }
    };

    let snapshot: Snapshot = match serde_json::from_value(value) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Discarding malformed snapshot: {}", e);
            return None;
        }
    };

    if snapshot.is_stale(now, max_age_hours) {
        debug!("Discarding snapshot from {} (stale)", snapshot.timestamp);
        return None;
    }
    Some(snapshot)
}

/// Remove the saved snapshot.
pub fn clear_snapshot(store: &mut dyn KvStore) -> Result<()> {
    store.delete(STATE_STORE, SNAPSHOT_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;
    use serde_json::json;

    const HOUR: i64 = 60 * 60 * 1000;

    fn snapshot(timestamp: i64) -> Snapshot {
        Snapshot {
            tabs: vec![SnapshotTab {
                id: "t1".to_string(),
                file_name: "a.md".to_string(),
                content: "# A".to_string(),
                is_new: false,
            }],
            active_tab_id: Some("t1".to_string()),
            timestamp,
        }
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let value = serde_json::to_value(snapshot(5)).unwrap();
        assert_eq!(value["activeTabId"], json!("t1"));
        assert_eq!(value["tabs"][0]["fileName"], json!("a.md"));
        assert_eq!(value["tabs"][0]["isNew"], json!(false));
    }

    #[test]
    fn test_fresh_snapshot_restores() {
        let now = 100 * HOUR;
        let mut store = MemoryKvStore::new();
        save_snapshot(&mut store, &snapshot(now - HOUR)).unwrap();
        let restored = load_snapshot(&store, now, DEFAULT_MAX_AGE_HOURS).unwrap();
        assert_eq!(restored.tabs.len(), 1);
    }

    #[test]
    fn test_stale_snapshot_discarded() {
        let now = 100 * HOUR;
        let mut store = MemoryKvStore::new();
        save_snapshot(&mut store, &snapshot(now - 25 * HOUR)).unwrap();
        assert!(load_snapshot(&store, now, DEFAULT_MAX_AGE_HOURS).is_none());
    }

    #[test]
    fn test_malformed_snapshot_is_absent() {
        let mut store = MemoryKvStore::new();
        store
            .put(STATE_STORE, SNAPSHOT_KEY, json!({"tabs": "nope"}), &[])
            .unwrap();
        assert!(load_snapshot(&store, 0, DEFAULT_MAX_AGE_HOURS).is_none());
        assert!(load_snapshot(&MemoryKvStore::new(), 0, DEFAULT_MAX_AGE_HOURS).is_none());
    }

    #[test]
    fn test_clear_snapshot() {
        let mut store = MemoryKvStore::new();
        save_snapshot(&mut store, &snapshot(0)).unwrap();
        clear_snapshot(&mut store).unwrap();
        assert!(load_snapshot(&store, 0, DEFAULT_MAX_AGE_HOURS).is_none());
    }
}
