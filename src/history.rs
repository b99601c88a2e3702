//! Per-document content history.
//!
//! Snapshots are kept newest first and capped; a snapshot identical to the
//! newest entry is not recorded again. Entries are persisted per document in
//! the `history` object store.

use crate::error::Result;
use crate::storage::KvStore;
use crate::string_utils::one_line_preview;
use chrono::{DateTime, Local};
use log::warn;
use serde::{Deserialize, Serialize};

/// Maximum entries kept per document.
pub const HISTORY_LIMIT: usize = 20;

/// Characters of content shown in an entry's preview.
pub const PREVIEW_CHARS: usize = 100;

/// Object store holding one entry list per document id.
pub const HISTORY_STORE: &str = "history";

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// One saved version of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub document_id: String,
    pub content: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub preview: String,
}

impl HistoryEntry {
    pub fn new(document_id: impl Into<String>, content: impl Into<String>, timestamp: i64) -> Self {
        let content = content.into();
        Self {
            document_id: document_id.into(),
            preview: one_line_preview(&content, PREVIEW_CHARS),
            content,
            timestamp,
        }
    }
}

/// Insert `entry` at the front unless it matches the newest entry.
///
/// Entries beyond `limit` are dropped from the old end. Returns whether the
/// entry was recorded.
pub fn push_entry(entries: &mut Vec<HistoryEntry>, entry: HistoryEntry, limit: usize) -> bool {
    if entries
        .first()
        .is_some_and(|newest| newest.content == entry.content)
    {
        return false;
    }
    entries.insert(0, entry);
    entries.truncate(limit.max(1));
    true
}

/// Load a document's history; unreadable data counts as no history.
pub fn load_history(store: &dyn KvStore, document_id: &str) -> Vec<HistoryEntry> {
    let value = match store.get(HISTORY_STORE, document_id) {
        Ok(Some(value)) => value,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read history for {}: {}", document_id, e);
            return Vec::new();
        }
    };
    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Discarding malformed history for {}: {}", document_id, e);
        Vec::new()
    })
}

/// Persist a document's full history list.
pub fn save_history(
    store: &mut dyn KvStore,
    document_id: &str,
    entries: &[HistoryEntry],
) -> Result<()> {
    let value = serde_json::to_value(entries)?;
    store.put(HISTORY_STORE, document_id, value, &[])
}

/// Relative age of a history entry for display.
pub fn format_history_time(timestamp: i64, now: i64) -> String {
    let age = now.saturating_sub(timestamp).max(0);
    if age < MINUTE_MS {
        return "Just now".to_string();
    }
    if age < HOUR_MS {
        let minutes = age / MINUTE_MS;
        return format!(
            "{} minute{} ago",
            minutes,
            if minutes == 1 { "" } else { "s" }
        );
    }
    if age < DAY_MS {
        let hours = age / HOUR_MS;
        return format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" });
    }
    match DateTime::from_timestamp_millis(timestamp) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "Unknown".to_string(),
    }
}
