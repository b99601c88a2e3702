//! Document state management
//!
//! This module defines [`Document`] (one open tab) and [`DocumentStore`], the
//! single owner of all open documents, the active-document pointer and the
//! in-memory history lists. Every mutation goes through a named operation so
//! the store can be tested without any UI.

use crate::error::{Error, Result};
use crate::history::{push_entry, HistoryEntry, HISTORY_LIMIT};
use crate::storage::{
    load_snapshot, save_snapshot, timestamp_index, KvStore, Snapshot, SnapshotTab, DOCUMENTS_STORE,
    UPDATED_AT_INDEX,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

const UNTITLED_PREFIX: &str = "Untitled-";
const UNTITLED_SUFFIX: &str = ".md";

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// One open document.
///
/// `content` changes on every edit; `original_content` only when the
/// document is persisted, so `is_dirty` is always their inequality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub file_name: String,
    /// Where the document was last read from or written to
    #[serde(default)]
    pub path: Option<PathBuf>,
    content: String,
    original_content: String,
    is_new: bool,
    #[serde(default)]
    pub scroll_position: f32,
    #[serde(default)]
    pub editor_scroll_position: f32,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    pub updated_at: i64,
}

impl Document {
    fn new(
        file_name: String,
        content: String,
        original_content: String,
        is_new: bool,
        now: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_name,
            path: None,
            content,
            original_content,
            is_new,
            scroll_position: 0.0,
            editor_scroll_position: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn original_content(&self) -> &str {
        &self.original_content
    }

    /// Content differs from what was last persisted.
    pub fn is_dirty(&self) -> bool {
        self.content != self.original_content
    }

    /// Never persisted.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Tab title, with a trailing `*` when dirty.
    pub fn title(&self) -> String {
        if self.is_dirty() {
            format!("{}*", self.file_name)
        } else {
            self.file_name.clone()
        }
    }

    fn set_content(&mut self, content: String, now: i64) -> bool {
        if content == self.content {
            return false;
        }
        self.content = content;
        self.updated_at = now;
        true
    }

    fn mark_persisted(&mut self, now: i64) {
        self.original_content = self.content.clone();
        self.is_new = false;
        self.updated_at = now;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store Types
// ─────────────────────────────────────────────────────────────────────────────

/// Editor state of the outgoing document, written back on a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorView {
    pub content: String,
    pub scroll_position: f32,
    pub editor_scroll_position: f32,
}

/// Result of a close request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The document has unsaved changes; the caller must confirm and retry
    /// with `force`.
    NeedsConfirmation {
        file_name: String,
    },
}

/// Owner of all open documents.
#[derive(Debug)]
pub struct DocumentStore {
    documents: Vec<Document>,
    active_id: Option<String>,
    untitled_counter: u32,
    histories: HashMap<String, Vec<HistoryEntry>>,
    history_limit: usize,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::with_history_limit(HISTORY_LIMIT)
    }

    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            documents: Vec::new(),
            active_id: None,
            untitled_counter: 0,
            histories: HashMap::new(),
            history_limit: history_limit.max(1),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────────────────────

    /// Open documents in tab order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Document> {
        self.documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&Document> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.documents.iter().any(Document::is_dirty)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    fn next_untitled_name(&mut self) -> String {
        self.untitled_counter += 1;
        format!(
            "{}{}{}",
            UNTITLED_PREFIX, self.untitled_counter, UNTITLED_SUFFIX
        )
    }

    fn insert_active(&mut self, document: Document) -> String {
        let id = document.id.clone();
        debug!("Created document {} ({})", document.file_name, id);
        self.documents.push(document);
        self.active_id = Some(id.clone());
        id
    }

    /// Create an empty untitled document and make it active.
    pub fn create_document(&mut self, now: i64) -> String {
        let name = self.next_untitled_name();
        self.insert_active(Document::new(name, String::new(), String::new(), true, now))
    }

    /// Add a document read from disk (clean) and make it active.
    pub fn open_document(
        &mut self,
        file_name: impl Into<String>,
        content: impl Into<String>,
        path: Option<PathBuf>,
        now: i64,
    ) -> String {
        let content = content.into();
        let mut document = Document::new(file_name.into(), content.clone(), content, false, now);
        document.path = path;
        self.insert_active(document)
    }

    /// Add an imported document. It has never been persisted, so any
    /// content makes it dirty.
    pub fn import_document(
        &mut self,
        file_name: impl Into<String>,
        markdown: impl Into<String>,
        now: i64,
    ) -> String {
        self.insert_active(Document::new(
            file_name.into(),
            markdown.into(),
            String::new(),
            true,
            now,
        ))
    }

    /// Switch the active document.
    ///
    /// The outgoing document receives `outgoing` first, then the pointer
    /// moves. Unknown ids leave everything unchanged.
    pub fn activate_document(
        &mut self,
        id: &str,
        outgoing: Option<EditorView>,
        now: i64,
    ) -> Result<()> {
        if self.get(id).is_none() {
            return Err(Error::DocumentNotFound(id.to_string()));
        }
        if let (Some(view), Some(current)) = (outgoing, self.active_id.clone()) {
            if let Ok(doc) = self.get_mut(&current) {
                doc.set_content(view.content, now);
                doc.scroll_position = view.scroll_position;
                doc.editor_scroll_position = view.editor_scroll_position;
            }
        }
        self.active_id = Some(id.to_string());
        debug!("Activated document {}", id);
        Ok(())
    }

    /// Close a document.
    ///
    /// A dirty document is only closed with `force`; otherwise the caller is
    /// asked to confirm. Closing the active document activates its right
    /// neighbour, or the left one when it was last.
    pub fn close_document(&mut self, id: &str, force: bool) -> Result<CloseOutcome> {
        let index = self
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;

        if self.documents[index].is_dirty() && !force {
            return Ok(CloseOutcome::NeedsConfirmation {
                file_name: self.documents[index].file_name.clone(),
            });
        }

        let closed = self.documents.remove(index);
        self.histories.remove(&closed.id);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = self
                .documents
                .get(index)
                .or_else(|| self.documents.last())
                .map(|d| d.id.clone());
        }
        debug!("Closed document {}", closed.file_name);
        Ok(CloseOutcome::Closed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace a document's content. Returns the new dirty state.
    pub fn record_edit(&mut self, id: &str, content: impl Into<String>, now: i64) -> Result<bool> {
        let doc = self.get_mut(id)?;
        doc.set_content(content.into(), now);
        Ok(doc.is_dirty())
    }

    /// Record a successful write of the current content.
    pub fn mark_saved(
        &mut self,
        id: &str,
        file_name: Option<String>,
        path: Option<PathBuf>,
        now: i64,
    ) -> Result<()> {
        let doc = self.get_mut(id)?;
        if let Some(name) = file_name {
            doc.file_name = name;
        }
        if path.is_some() {
            doc.path = path;
        }
        doc.mark_persisted(now);
        info!("Saved {}", doc.file_name);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    /// Append the current content to the document's history if it changed
    /// since the newest entry. Returns whether an entry was added.
    ///
    /// Blank content is never recorded.
    pub fn snapshot_history(&mut self, id: &str, now: i64) -> Result<bool> {
        let content = self
            .get(id)
            .map(|d| d.content.clone())
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;
        if content.trim().is_empty() {
            return Ok(false);
        }
        let limit = self.history_limit;
        let entries = self.histories.entry(id.to_string()).or_default();
        Ok(push_entry(
            entries,
            HistoryEntry::new(id, content, now),
            limit,
        ))
    }

    /// History of a document, newest first.
    pub fn history(&self, id: &str) -> &[HistoryEntry] {
        self.histories.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace in-memory history, e.g. after loading it from storage.
    pub fn set_history(&mut self, id: &str, mut entries: Vec<HistoryEntry>) {
        entries.truncate(self.history_limit);
        self.histories.insert(id.to_string(), entries);
    }

    /// Put the content of history entry `index` back into the document.
    pub fn restore_from_history(&mut self, id: &str, index: usize, now: i64) -> Result<bool> {
        let content = self
            .history(id)
            .get(index)
            .map(|e| e.content.clone())
            .ok_or_else(|| {
                Error::Application(format!("history entry {} does not exist for {}", index, id))
            })?;
        self.record_edit(id, content, now)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Save the full tab set as the restart snapshot.
    pub fn persist_snapshot(&self, kv: &mut dyn KvStore, now: i64) -> Result<()> {
        let snapshot = Snapshot {
            tabs: self
                .documents
                .iter()
                .map(|d| SnapshotTab {
                    id: d.id.clone(),
                    file_name: d.file_name.clone(),
                    content: d.content.clone(),
                    is_new: d.is_new,
                })
                .collect(),
            active_tab_id: self.active_id.clone(),
            timestamp: now,
        };
        save_snapshot(kv, &snapshot)
    }

    /// Replace the open documents with a saved snapshot.
    ///
    /// Returns the number of documents restored; zero when the snapshot is
    /// missing, malformed or stale, in which case nothing changes.
    pub fn restore_snapshot(&mut self, kv: &dyn KvStore, now: i64, max_age_hours: u32) -> usize {
        let Some(snapshot) = load_snapshot(kv, now, max_age_hours) else {
            return 0;
        };
        if snapshot.tabs.is_empty() {
            return 0;
        }

        self.documents = snapshot
            .tabs
            .into_iter()
            .map(|tab| {
                let original = if tab.is_new {
                    String::new()
                } else {
                    tab.content.clone()
                };
                Document {
                    id: tab.id,
                    file_name: tab.file_name,
                    path: None,
                    content: tab.content,
                    original_content: original,
                    is_new: tab.is_new,
                    scroll_position: 0.0,
                    editor_scroll_position: 0.0,
                    created_at: snapshot.timestamp,
                    updated_at: snapshot.timestamp,
                }
            })
            .collect();
        self.histories.clear();

        self.active_id = snapshot
            .active_tab_id
            .filter(|id| self.get(id).is_some())
            .or_else(|| self.documents.first().map(|d| d.id.clone()));

        self.untitled_counter = self
            .documents
            .iter()
            .filter_map(|d| {
                d.file_name
                    .strip_prefix(UNTITLED_PREFIX)?
                    .strip_suffix(UNTITLED_SUFFIX)?
                    .parse::<u32>()
                    .ok()
            })
            .max()
            .unwrap_or(0);

        info!(
            "Restored {} document(s) from snapshot",
            self.documents.len()
        );
        self.documents.len()
    }

    /// Write one document to the documents store.
    ///
    /// Dirty and new flags are left alone; only [`Self::mark_saved`] moves
    /// the saved baseline.
    pub fn store_document(&self, kv: &mut dyn KvStore, id: &str) -> Result<()> {
        let doc = self
            .get(id)
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;
        let value = serde_json::to_value(doc)?;
        let index = [(UPDATED_AT_INDEX, timestamp_index(doc.updated_at))];
        kv.put(DOCUMENTS_STORE, id, value, &index)
    }
}

/// All persisted documents, most recently updated first.
pub fn stored_documents(kv: &dyn KvStore) -> Result<Vec<Document>> {
    let values = kv.get_all_ordered_by(DOCUMENTS_STORE, UPDATED_AT_INDEX)?;
    Ok(values
        .into_iter()
        .rev()
        .filter_map(|v| match serde_json::from_value::<Document>(v) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Skipping malformed stored document: {}", e);
                None
            }
        })
        .collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
