//! Dialog collaborator
//!
//! The core asks a `DialogCollaborator` which file to open, where to save
//! and whether unsaved changes may be discarded. Cancelling a picker is
//! `Ok(None)`, never an error.

use crate::error::Result;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// File extension filters for supported file types.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "text"];
pub const WORD_EXTENSIONS: &[&str] = &["docx", "doc"];

/// Kind of file a picker should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFilter {
    /// Markdown and plain text
    Markdown,
    /// Word documents for import
    Word,
    /// Export outputs
    Export,
}

impl FileFilter {
    /// Whether `path` has an extension accepted by this filter.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
        else {
            return false;
        };
        match self {
            FileFilter::Markdown => {
                MARKDOWN_EXTENSIONS.contains(&ext.as_str())
                    || TEXT_EXTENSIONS.contains(&ext.as_str())
            }
            FileFilter::Word => WORD_EXTENSIONS.contains(&ext.as_str()),
            FileFilter::Export => matches!(ext.as_str(), "pdf" | "docx" | "html" | "htm"),
        }
    }
}

/// User-facing pickers and prompts.
pub trait DialogCollaborator {
    /// Ask for a file to open; `None` when cancelled.
    fn pick_open_path(&mut self, filter: FileFilter) -> Result<Option<PathBuf>>;

    /// Ask where to save, proposing `suggested_name`; `None` when cancelled.
    fn pick_save_path(&mut self, suggested_name: &str) -> Result<Option<PathBuf>>;

    /// Ask whether unsaved changes in `file_name` may be thrown away.
    fn confirm_discard(&mut self, file_name: &str) -> bool;
}

/// Dialogs answered from pre-recorded responses.
///
/// Used by the command-line front end, where paths come from arguments,
/// and by tests. An exhausted queue behaves like a cancelled picker.
#[derive(Debug, Clone, Default)]
pub struct PresetDialogs {
    open_paths: VecDeque<PathBuf>,
    save_dir: Option<PathBuf>,
    save_paths: VecDeque<PathBuf>,
    discard: bool,
    prompts: Vec<String>,
}

impl PresetDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next open picker.
    pub fn with_open_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.open_paths.push_back(path.into());
        self
    }

    /// Queue an answer for the next save picker.
    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_paths.push_back(path.into());
        self
    }

    /// Answer save pickers with `dir` joined to the suggested name once the
    /// explicit queue is empty.
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = Some(dir.into());
        self
    }

    /// Answer for every discard prompt.
    pub fn with_discard(mut self, discard: bool) -> Self {
        self.discard = discard;
        self
    }

    /// File names the user was asked about, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl DialogCollaborator for PresetDialogs {
    fn pick_open_path(&mut self, _filter: FileFilter) -> Result<Option<PathBuf>> {
        Ok(self.open_paths.pop_front())
    }

    fn pick_save_path(&mut self, suggested_name: &str) -> Result<Option<PathBuf>> {
        if let Some(path) = self.save_paths.pop_front() {
            return Ok(Some(path));
        }
        Ok(self.save_dir.as_ref().map(|dir| dir.join(suggested_name)))
    }

    fn confirm_discard(&mut self, file_name: &str) -> bool {
        self.prompts.push(file_name.to_string());
        self.discard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters() {
        assert!(FileFilter::Markdown.accepts(Path::new("notes.MD")));
        assert!(FileFilter::Markdown.accepts(Path::new("a.txt")));
        assert!(!FileFilter::Markdown.accepts(Path::new("a.docx")));
        assert!(FileFilter::Word.accepts(Path::new("report.docx")));
        assert!(FileFilter::Export.accepts(Path::new("out.pdf")));
        assert!(!FileFilter::Word.accepts(Path::new("no_extension")));
    }

    #[test]
    fn test_exhausted_queue_is_cancel() {
        let mut dialogs = PresetDialogs::new().with_open_path("/a.md");
        assert_eq!(
            dialogs.pick_open_path(FileFilter::Markdown).unwrap(),
            Some(PathBuf::from("/a.md"))
        );
        assert_eq!(dialogs.pick_open_path(FileFilter::Markdown).unwrap(), None);
        assert_eq!(dialogs.pick_save_path("x.pdf").unwrap(), None);
    }

    #[test]
    fn test_save_dir_uses_suggested_name() {
        let mut dialogs = PresetDialogs::new()
            .with_save_path("/first.pdf")
            .with_save_dir("/out");
        assert_eq!(
            dialogs.pick_save_path("x.pdf").unwrap(),
            Some(PathBuf::from("/first.pdf"))
        );
        assert_eq!(
            dialogs.pick_save_path("notes.docx").unwrap(),
            Some(PathBuf::from("/out/notes.docx"))
        );
    }

    #[test]
    fn test_confirm_discard_records_prompt() {
        let mut dialogs = PresetDialogs::new().with_discard(true);
        assert!(dialogs.confirm_discard("draft.md"));
        assert_eq!(dialogs.prompts(), ["draft.md".to_string()]);
    }
}
