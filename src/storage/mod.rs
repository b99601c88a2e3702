//! Persistence
//!
//! - `kv.rs` - key-value store trait with memory and JSON-file engines
//! - `snapshot.rs` - open-tab snapshot codec with a staleness window

mod kv;
mod snapshot;

pub use kv::{JsonFileKvStore, KvStore, MemoryKvStore, Record};
pub use snapshot::{
    clear_snapshot, load_snapshot, save_snapshot, Snapshot, SnapshotTab, DEFAULT_MAX_AGE_HOURS,
    SNAPSHOT_KEY, STATE_STORE,
};

/// Object store holding persisted documents, keyed by document id.
pub const DOCUMENTS_STORE: &str = "documents";

/// Secondary index on [`DOCUMENTS_STORE`] ordering documents by last update.
pub const UPDATED_AT_INDEX: &str = "updated_at";

/// Index value for a millisecond timestamp; zero-padded so string order
/// matches numeric order.
pub fn timestamp_index(timestamp: i64) -> String {
    format!("{:020}", timestamp.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_index_orders_lexically() {
        assert!(timestamp_index(9) < timestamp_index(10));
        assert!(timestamp_index(1_700_000_000_000) < timestamp_index(1_800_000_000_000));
        assert_eq!(timestamp_index(-5), timestamp_index(0));
    }
}
