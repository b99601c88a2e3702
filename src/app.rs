//! Main application module for Downedit
//!
//! `DowneditApp` is the single owner of the open documents, the persistence
//! engine, the settings and the two debounce timers. Front ends (the CLI, a
//! future GUI) drive it through named actions and call [`DowneditApp::tick`]
//! from their event loop.
//!
//! Timers belong to the active document: every edit reschedules both,
//! switching or closing cancels both and pending work is dropped.

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::export::{export_document, ExportFormat};
use crate::files::{DialogCollaborator, FileCollaborator, FileFilter};
use crate::history::{format_history_time, load_history, save_history};
use crate::import::{import_word, imported_file_name};
use crate::markdown::{
    apply_format, beautify, extract_outline, FormatCommand, FormatResult, OutlineHeading,
};
use crate::state::{stored_documents, CloseOutcome, Document, DocumentStore, EditorView};
use crate::stats::DocumentStats;
use crate::storage::KvStore;
use crate::timers::DebounceTimer;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// What a call to [`DowneditApp::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The active document and the tab snapshot were persisted
    pub auto_saved: bool,
    /// A history entry was recorded
    pub history_recorded: bool,
}

/// A completed Word import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub document_id: String,
    pub warnings: Vec<String>,
}

/// Application controller.
pub struct DowneditApp {
    store: DocumentStore,
    kv: Box<dyn KvStore>,
    settings: Settings,
    files: Box<dyn FileCollaborator>,
    dialogs: Box<dyn DialogCollaborator>,
    auto_save_timer: DebounceTimer,
    history_timer: DebounceTimer,
    /// Document the pending timers were armed for
    timer_document: Option<String>,
}

impl DowneditApp {
    pub fn new(
        mut settings: Settings,
        kv: Box<dyn KvStore>,
        files: Box<dyn FileCollaborator>,
        dialogs: Box<dyn DialogCollaborator>,
    ) -> Self {
        settings.sanitize();
        Self {
            store: DocumentStore::with_history_limit(settings.history_limit),
            auto_save_timer: DebounceTimer::new(settings.auto_save_delay_ms),
            history_timer: DebounceTimer::new(settings.history_delay_ms),
            kv,
            settings,
            files,
            dialogs,
            timer_document: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn active(&self) -> Option<&Document> {
        self.store.active()
    }

    /// Word and character counts of the active document.
    pub fn active_stats(&self) -> Option<DocumentStats> {
        self.active().map(|d| DocumentStats::from_text(d.content()))
    }

    /// ATX headings of the active document.
    pub fn active_outline(&self) -> Vec<OutlineHeading> {
        self.active()
            .map(|d| extract_outline(d.content()))
            .unwrap_or_default()
    }

    /// History of the active document with display times, newest first.
    pub fn active_history(&self, now: i64) -> Vec<(String, String)> {
        let Some(id) = self.store.active_id() else {
            return Vec::new();
        };
        self.store
            .history(id)
            .iter()
            .map(|e| (format_history_time(e.timestamp, now), e.preview.clone()))
            .collect()
    }

    pub fn is_auto_save_pending(&self) -> bool {
        self.auto_save_timer.is_pending()
    }

    pub fn is_history_pending(&self) -> bool {
        self.history_timer.is_pending()
    }

    /// Persisted documents, most recently updated first.
    pub fn stored_documents(&self) -> Result<Vec<Document>> {
        stored_documents(self.kv.as_ref())
    }

    fn active_id_owned(&self) -> Result<String> {
        self.store
            .active_id()
            .map(str::to_string)
            .ok_or_else(|| Error::Application("No active document".to_string()))
    }

    fn active_document(&self) -> Result<&Document> {
        self.store
            .active()
            .ok_or_else(|| Error::Application("No active document".to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Timers
    // ─────────────────────────────────────────────────────────────────────────

    fn schedule_timers(&mut self, id: String, now: i64) {
        self.auto_save_timer.schedule(now);
        self.history_timer.schedule(now);
        self.timer_document = Some(id);
    }

    fn cancel_timers(&mut self) {
        if self.timer_document.take().is_some() {
            debug!("Dropping pending auto-save and history work");
        }
        self.auto_save_timer.cancel();
        self.history_timer.cancel();
    }

    /// Fire whichever timers are due at `now`.
    pub fn tick(&mut self, now: i64) -> Result<TickOutcome> {
        let mut outcome = TickOutcome::default();
        let Some(id) = self.timer_document.clone() else {
            return Ok(outcome);
        };

        if self.auto_save_timer.poll(now) {
            self.store.store_document(self.kv.as_mut(), &id)?;
            self.store.persist_snapshot(self.kv.as_mut(), now)?;
            debug!("Auto-saved {}", id);
            outcome.auto_saved = true;
        }

        if self.history_timer.poll(now) && self.store.snapshot_history(&id, now)? {
            save_history(self.kv.as_mut(), &id, self.store.history(&id))?;
            outcome.history_recorded = true;
        }

        if !self.auto_save_timer.is_pending() && !self.history_timer.is_pending() {
            self.timer_document = None;
        }
        Ok(outcome)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Restore the last tab set and its histories.
    ///
    /// Always leaves at least one document open. Returns the number of
    /// documents restored from the snapshot.
    pub fn startup(&mut self, now: i64) -> usize {
        let restored = self.store.restore_snapshot(
            self.kv.as_ref(),
            now,
            self.settings.snapshot_max_age_hours,
        );

        let ids: Vec<String> = self
            .store
            .documents()
            .iter()
            .map(|d| d.id.clone())
            .collect();
        for id in ids {
            let entries = load_history(self.kv.as_ref(), &id);
            if !entries.is_empty() {
                self.store.set_history(&id, entries);
            }
        }

        if self.store.is_empty() {
            self.store.create_document(now);
        }
        info!(
            "Session started with {} document(s), {} restored",
            self.store.len(),
            restored
        );
        restored
    }

    /// Save the tab snapshot; call before exiting.
    pub fn shutdown(&mut self, now: i64) -> Result<()> {
        self.cancel_timers();
        self.store.persist_snapshot(self.kv.as_mut(), now)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Documents
    // ─────────────────────────────────────────────────────────────────────────

    pub fn new_document(&mut self, now: i64) -> String {
        self.cancel_timers();
        self.store.create_document(now)
    }

    /// Ask for a markdown file and open it. `None` when cancelled.
    pub fn open_file(&mut self, now: i64) -> Result<Option<String>> {
        match self.dialogs.pick_open_path(FileFilter::Markdown)? {
            Some(path) => self.open_path(&path, now).map(Some),
            None => Ok(None),
        }
    }

    /// Open a markdown file from `path` as a clean document.
    pub fn open_path(&mut self, path: &Path, now: i64) -> Result<String> {
        let content = self.files.read_text(path)?;
        let name = self.files.file_name_of(path);
        self.cancel_timers();
        let id = self
            .store
            .open_document(name, content, Some(path.to_path_buf()), now);
        self.settings.add_recent_file(path.to_path_buf());
        info!("Opened {}", path.display());
        Ok(id)
    }

    /// Make `id` the active document, writing `outgoing` back first.
    pub fn switch_to(&mut self, id: &str, outgoing: Option<EditorView>, now: i64) -> Result<()> {
        self.store
            .get(id)
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;
        self.cancel_timers();
        self.store.activate_document(id, outgoing, now)
    }

    /// Close a document, asking before unsaved changes are discarded.
    ///
    /// Returns `false` when the user kept the document open. Closing the
    /// last document opens a fresh untitled one.
    pub fn close(&mut self, id: &str, now: i64) -> Result<bool> {
        let closed = match self.store.close_document(id, false)? {
            CloseOutcome::Closed => true,
            CloseOutcome::NeedsConfirmation { file_name } => {
                if self.dialogs.confirm_discard(&file_name) {
                    self.store.close_document(id, true)? == CloseOutcome::Closed
                } else {
                    false
                }
            }
        };

        if closed {
            if self.timer_document.as_deref() == Some(id) {
                self.cancel_timers();
            }
            if self.store.is_empty() {
                self.store.create_document(now);
            }
        }
        Ok(closed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the active document's content and restart both timers.
    /// Returns the new dirty state.
    pub fn edit(&mut self, content: impl Into<String>, now: i64) -> Result<bool> {
        let id = self.active_id_owned()?;
        let dirty = self.store.record_edit(&id, content, now)?;
        self.schedule_timers(id, now);
        Ok(dirty)
    }

    /// Apply a formatting command to the active document.
    pub fn format(
        &mut self,
        selection: (usize, usize),
        command: &FormatCommand,
        now: i64,
    ) -> Result<FormatResult> {
        let result = apply_format(self.active_document()?.content(), selection, command);
        self.edit(result.text.clone(), now)?;
        Ok(result)
    }

    /// Run the beautifier over the active document. Returns whether the
    /// content changed.
    pub fn beautify_active(&mut self, now: i64) -> Result<bool> {
        let current = self.active_document()?.content();
        let beautified = beautify(current, &self.settings.beautify);
        if beautified == current {
            debug!("Beautify: no changes");
            return Ok(false);
        }
        self.edit(beautified, now)?;
        info!("Beautified active document");
        Ok(true)
    }

    /// Put history entry `index` back into the active document.
    pub fn restore_history(&mut self, index: usize, now: i64) -> Result<bool> {
        let id = self.active_id_owned()?;
        let dirty = self.store.restore_from_history(&id, index, now)?;
        self.schedule_timers(id, now);
        Ok(dirty)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Save / Export / Import
    // ─────────────────────────────────────────────────────────────────────────

    /// Write the active document to its path, asking for one if it has
    /// none. Returns the path written, or `None` when cancelled.
    pub fn save_active(&mut self, now: i64) -> Result<Option<PathBuf>> {
        match self.active_document()?.path.clone() {
            Some(path) => self.save_active_to(path, now).map(Some),
            None => self.save_active_as(now),
        }
    }

    /// Always ask where to write the active document.
    pub fn save_active_as(&mut self, now: i64) -> Result<Option<PathBuf>> {
        let suggested = self.active_document()?.file_name.clone();
        match self.dialogs.pick_save_path(&suggested)? {
            Some(path) => self.save_active_to(path, now).map(Some),
            None => Ok(None),
        }
    }

    fn save_active_to(&mut self, path: PathBuf, now: i64) -> Result<PathBuf> {
        let id = self.active_id_owned()?;
        self.files
            .write_text(&path, self.active_document()?.content())?;

        let name = self.files.file_name_of(&path);
        self.store
            .mark_saved(&id, Some(name), Some(path.clone()), now)?;
        if let Err(e) = self.store.store_document(self.kv.as_mut(), &id) {
            warn!("Saved to disk but failed to update store: {}", e);
        }
        self.settings.add_recent_file(path.clone());
        Ok(path)
    }

    /// Export the active document. Returns the path written, or `None`
    /// when the save picker was cancelled.
    ///
    /// Conversion happens before anything is written, so a failure leaves
    /// no partial artifact behind.
    pub fn export_active(&mut self, format: ExportFormat) -> Result<Option<PathBuf>> {
        let doc = self.active_document()?;
        let artifact = export_document(doc.content(), &doc.file_name, format, &self.settings)?;

        let Some(path) = self.dialogs.pick_save_path(&artifact.file_name)? else {
            debug!("{} export cancelled", format.label());
            return Ok(None);
        };
        self.files.write_binary(&path, &artifact.bytes)?;
        info!(
            "Exported {} ({} bytes) to {}",
            format.label(),
            artifact.bytes.len(),
            path.display()
        );
        Ok(Some(path))
    }

    /// Ask for a Word file and import it as a new document. `None` when
    /// cancelled.
    pub fn import_word_file(&mut self, now: i64) -> Result<Option<ImportOutcome>> {
        match self.dialogs.pick_open_path(FileFilter::Word)? {
            Some(path) => self.import_word_path(&path, now).map(Some),
            None => Ok(None),
        }
    }

    /// Import the Word file at `path` as a new, unsaved document.
    pub fn import_word_path(&mut self, path: &Path, now: i64) -> Result<ImportOutcome> {
        let bytes = self.files.read_binary(path)?;
        let result = import_word(&bytes, &self.settings.import)?;

        self.cancel_timers();
        let document_id =
            self.store
                .import_document(imported_file_name(path), result.markdown, now);
        Ok(ImportOutcome {
            document_id,
            warnings: result.warnings,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{NativeFiles, PresetDialogs};
    use crate::storage::MemoryKvStore;
    use tempfile::TempDir;

    const HOUR: i64 = 60 * 60 * 1000;

    fn app_with(dialogs: PresetDialogs) -> DowneditApp {
        DowneditApp::new(
            Settings::default(),
            Box::new(MemoryKvStore::new()),
            Box::new(NativeFiles::new()),
            Box::new(dialogs),
        )
    }

    fn app() -> DowneditApp {
        let mut app = app_with(PresetDialogs::new());
        app.startup(0);
        app
    }

    #[test]
    fn test_startup_opens_untitled() {
        let app = app();
        assert_eq!(app.store().len(), 1);
        assert_eq!(app.active().unwrap().file_name, "Untitled-1.md");
    }

    #[test]
    fn test_edit_schedules_both_timers() {
        let mut app = app();
        assert!(app.edit("hello", 0).unwrap());
        assert!(app.is_auto_save_pending());
        assert!(app.is_history_pending());

        let outcome = app.tick(999).unwrap();
        assert_eq!(outcome, TickOutcome::default());

        let outcome = app.tick(1_000).unwrap();
        assert!(outcome.auto_saved);
        assert!(!outcome.history_recorded);
        assert!(app.active().unwrap().is_dirty());
        assert!(app.active().unwrap().is_new());
        assert_eq!(app.stored_documents().unwrap().len(), 1);

        let outcome = app.tick(30_000).unwrap();
        assert!(outcome.history_recorded);
        assert_eq!(app.active_history(30_000).len(), 1);
        assert!(!app.is_history_pending());
    }

    #[test]
    fn test_keystroke_burst_coalesces() {
        let mut app = app();
        app.edit("a", 0).unwrap();
        app.edit("ab", 500).unwrap();
        app.edit("abc", 900).unwrap();
        assert!(!app.tick(1_500).unwrap().auto_saved);
        assert!(app.tick(1_900).unwrap().auto_saved);
    }

    #[test]
    fn test_switch_drops_pending_work() {
        let mut app = app();
        let first = app.active().unwrap().id.clone();
        app.edit("draft", 0).unwrap();
        let second = app.new_document(10);
        assert!(!app.is_auto_save_pending());

        app.switch_to(&first, None, 20).unwrap();
        assert_eq!(app.tick(60_000).unwrap(), TickOutcome::default());
        assert_ne!(first, second);
        assert!(app.store().history(&first).is_empty());
    }

    #[test]
    fn test_close_dirty_declined_keeps_document() {
        let mut app = app_with(PresetDialogs::new().with_discard(false));
        app.startup(0);
        let id = app.active().unwrap().id.clone();
        app.edit("unsaved", 0).unwrap();

        assert!(!app.close(&id, 10).unwrap());
        assert!(app.store().get(&id).is_some());
        assert!(app.is_auto_save_pending());
    }

    #[test]
    fn test_auto_save_does_not_count_as_saving_to_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "on disk\n").unwrap();

        let mut app = app_with(PresetDialogs::new().with_discard(false));
        app.startup(0);
        let id = app.open_path(&path, 0).unwrap();
        app.edit("edited\n", 1_000).unwrap();
        assert!(app.tick(2_000).unwrap().auto_saved);

        let doc = app.store().get(&id).unwrap();
        assert!(doc.is_dirty());
        assert_eq!(doc.original_content(), "on disk\n");
        assert!(!app.close(&id, 2_500).unwrap());
        assert!(app.store().get(&id).is_some());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "on disk\n");
    }

    #[test]
    fn test_close_dirty_confirmed_opens_fresh_document() {
        let mut app = app_with(PresetDialogs::new().with_discard(true));
        app.startup(0);
        let id = app.active().unwrap().id.clone();
        app.edit("unsaved", 0).unwrap();

        assert!(app.close(&id, 10).unwrap());
        assert!(app.store().get(&id).is_none());
        assert_eq!(app.store().len(), 1);
        assert!(!app.is_auto_save_pending());
    }

    #[test]
    fn test_save_as_cancelled_is_noop() {
        let mut app = app();
        app.edit("content", 0).unwrap();
        assert_eq!(app.save_active(10).unwrap(), None);
        assert!(app.active().unwrap().is_dirty());
    }

    #[test]
    fn test_save_writes_file_and_renames() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("notes.md");
        let mut app = app_with(PresetDialogs::new().with_save_path(&target));
        app.startup(0);
        app.edit("# Notes\n", 0).unwrap();

        assert_eq!(app.save_active(10).unwrap(), Some(target.clone()));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# Notes\n");
        let doc = app.active().unwrap();
        assert_eq!(doc.file_name, "notes.md");
        assert!(!doc.is_dirty());
        assert_eq!(app.settings().recent_files[0], target);

        app.edit("# Notes\n\nmore\n", 20).unwrap();
        assert_eq!(app.save_active(30).unwrap(), Some(target.clone()));
        assert!(std::fs::read_to_string(&target).unwrap().contains("more"));
    }

    #[test]
    fn test_open_path_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("readme.md");
        std::fs::write(&path, "# Readme\n").unwrap();

        let mut app = app();
        let id = app.open_path(&path, 0).unwrap();
        let doc = app.store().get(&id).unwrap();
        assert_eq!(doc.file_name, "readme.md");
        assert!(!doc.is_dirty());

        let before = app.store().len();
        assert!(app.open_path(&dir.path().join("gone.md"), 0).is_err());
        assert_eq!(app.store().len(), before);
    }

    #[test]
    fn test_export_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(PresetDialogs::new().with_save_dir(dir.path()));
        app.startup(0);
        app.edit("# Title\n\nBody **bold**\n", 0).unwrap();

        let path = app.export_active(ExportFormat::Html).unwrap().unwrap();
        assert_eq!(path, dir.path().join("Untitled-1.html"));
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("<strong>bold</strong>"));

        let pdf = app.export_active(ExportFormat::Pdf).unwrap().unwrap();
        assert!(std::fs::read(pdf).unwrap().starts_with(b"%PDF"));
        assert!(app.active().unwrap().is_dirty());
    }

    #[test]
    fn test_export_cancelled_writes_nothing() {
        let mut app = app();
        assert_eq!(app.export_active(ExportFormat::Docx).unwrap(), None);
    }

    #[test]
    fn test_import_word_round_trip() {
        let dir = TempDir::new().unwrap();
        let docx = dir.path().join("Report.docx");
        let bytes = crate::export::render_docx(
            "# Report\n\nSome **bold** text.\n",
            "Report",
            &Settings::default().docx,
        )
        .unwrap();
        std::fs::write(&docx, bytes).unwrap();

        let mut app = app_with(PresetDialogs::new().with_open_path(&docx));
        app.startup(0);
        let outcome = app.import_word_file(5).unwrap().unwrap();
        let doc = app.store().get(&outcome.document_id).unwrap();
        assert_eq!(doc.file_name, "Report.md");
        assert!(doc.is_dirty());
        assert!(doc.content().starts_with("# Report"));
        assert!(doc.content().contains("**bold**"));
    }

    #[test]
    fn test_import_invalid_file_leaves_state() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("bogus.docx");
        std::fs::write(&bogus, b"not a zip").unwrap();

        let mut app = app();
        let before = app.store().len();
        let err = app.import_word_path(&bogus, 0).unwrap_err();
        assert!(matches!(err, Error::Import { .. }));
        assert_eq!(app.store().len(), before);
    }

    #[test]
    fn test_beautify_active() {
        let mut app = app();
        app.edit("Title\n===\n* a\n* b\n", 0).unwrap();
        assert!(app.beautify_active(10).unwrap());
        assert!(app.active().unwrap().content().starts_with("# Title"));
        assert!(!app.beautify_active(20).unwrap());
    }

    #[test]
    fn test_format_bold() {
        let mut app = app();
        app.edit("make bold", 0).unwrap();
        let result = app.format((5, 9), &FormatCommand::Bold, 10).unwrap();
        assert_eq!(result.text, "make **bold**");
        assert_eq!(app.active().unwrap().content(), "make **bold**");
    }

    #[test]
    fn test_restart_restores_tabs_and_history() {
        let mut kv = MemoryKvStore::new();
        {
            let mut store = DocumentStore::new();
            let id = store.create_document(0);
            store.record_edit(&id, "v1", 0).unwrap();
            store.snapshot_history(&id, 0).unwrap();
            save_history(&mut kv, &id, store.history(&id)).unwrap();
            store.persist_snapshot(&mut kv, 0).unwrap();
        }

        let mut app = DowneditApp::new(
            Settings::default(),
            Box::new(kv),
            Box::new(NativeFiles::new()),
            Box::new(PresetDialogs::new()),
        );
        assert_eq!(app.startup(HOUR), 1);
        assert_eq!(app.active().unwrap().content(), "v1");
        assert_eq!(app.active_history(HOUR).len(), 1);

        app.edit("v2", HOUR).unwrap();
        assert!(app.restore_history(0, HOUR + 1).is_ok());
        assert_eq!(app.active().unwrap().content(), "v1");
    }

    #[test]
    fn test_active_outline() {
        let mut app = app();
        app.edit("# One\n\n```\n# not a heading\n```\n## Two\n", 0)
            .unwrap();
        let outline = app.active_outline();
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[1].level, 2);
        assert_eq!(outline[1].text, "Two");
    }

    #[test]
    fn test_active_stats() {
        let mut app = app();
        app.edit("two words", 0).unwrap();
        let stats = app.active_stats().unwrap();
        assert_eq!(stats.words, 2);
        assert_eq!(stats.characters, 9);
    }
}
