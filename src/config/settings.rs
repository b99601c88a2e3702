//! User settings and preferences for Downedit
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use crate::export::{DocxOptions, HtmlOptions, PdfOptions};
use crate::import::ImportOptions;
use crate::markdown::BeautifyOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Export & Import
    // ─────────────────────────────────────────────────────────────────────────
    /// PDF layout and colours
    pub pdf: PdfOptions,

    /// DOCX page setup
    pub docx: DocxOptions,

    /// Standalone HTML styling
    pub html: HtmlOptions,

    /// Word import behaviour
    pub import: ImportOptions,

    // ─────────────────────────────────────────────────────────────────────────
    // Beautifier
    // ─────────────────────────────────────────────────────────────────────────
    pub beautify: BeautifyOptions,

    // ─────────────────────────────────────────────────────────────────────────
    // Timers & History
    // ─────────────────────────────────────────────────────────────────────────
    /// Idle time before an edited document is auto-saved
    pub auto_save_delay_ms: u64,

    /// Idle time before a history snapshot is taken
    pub history_delay_ms: u64,

    /// Entries kept per document history
    pub history_limit: usize,

    /// Age after which the restart snapshot is ignored
    pub snapshot_max_age_hours: u32,

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────
    /// Recently opened files (most recent first)
    pub recent_files: Vec<PathBuf>,

    /// Maximum number of recent files to remember
    pub max_recent_files: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pdf: PdfOptions::default(),
            docx: DocxOptions::default(),
            html: HtmlOptions::default(),
            import: ImportOptions::default(),

            beautify: BeautifyOptions::default(),

            auto_save_delay_ms: 1_000,
            history_delay_ms: 30_000,
            history_limit: 20,
            snapshot_max_age_hours: 24,

            recent_files: Vec::new(),
            max_recent_files: 10,
        }
    }
}

impl Settings {
    /// Add a file to the recent files list.
    ///
    /// If the file already exists in the list, it's moved to the front.
    /// The list is trimmed to `max_recent_files`.
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.max_recent_files);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Shortest allowed auto-save delay.
    pub const MIN_AUTO_SAVE_DELAY_MS: u64 = 100;
    /// Shortest allowed history delay.
    pub const MIN_HISTORY_DELAY_MS: u64 = 1_000;
    /// Largest allowed history length.
    pub const MAX_HISTORY_LIMIT: usize = 200;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.pdf.sanitize();
        self.docx.sanitize();
        self.beautify.sanitize();

        self.auto_save_delay_ms = self.auto_save_delay_ms.max(Self::MIN_AUTO_SAVE_DELAY_MS);
        self.history_delay_ms = self.history_delay_ms.max(Self::MIN_HISTORY_DELAY_MS);
        self.history_limit = self.history_limit.clamp(1, Self::MAX_HISTORY_LIMIT);
        if self.snapshot_max_age_hours == 0 {
            self.snapshot_max_age_hours = 24;
        }

        if self.max_recent_files == 0 {
            self.max_recent_files = 10;
        } else if self.max_recent_files > 100 {
            self.max_recent_files = 100;
        }
        self.recent_files.truncate(self.max_recent_files);
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{PageSize, PdfTheme};

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.pdf.theme, PdfTheme::Professional);
        assert_eq!(settings.pdf.margin_mm, 20.0);
        assert_eq!(settings.docx.margin_inches, 1.0);
        assert!(settings.html.include_dark_mode);
        assert!(settings.import.preserve_images);
        assert_eq!(settings.beautify.list_marker, '-');
        assert!(!settings.beautify.wrap_lines);
        assert_eq!(settings.auto_save_delay_ms, 1000);
        assert_eq!(settings.history_delay_ms, 30_000);
        assert_eq!(settings.history_limit, 20);
        assert_eq!(settings.snapshot_max_age_hours, 24);
        assert_eq!(settings.max_recent_files, 10);
    }

    #[test]
    fn test_add_recent_file() {
        let mut settings = Settings {
            max_recent_files: 3,
            ..Settings::default()
        };

        settings.add_recent_file(PathBuf::from("/file1.md"));
        settings.add_recent_file(PathBuf::from("/file2.md"));
        settings.add_recent_file(PathBuf::from("/file3.md"));
        assert_eq!(settings.recent_files[0], PathBuf::from("/file3.md"));

        settings.add_recent_file(PathBuf::from("/file1.md"));
        assert_eq!(settings.recent_files[0], PathBuf::from("/file1.md"));
        assert_eq!(settings.recent_files.len(), 3);

        settings.add_recent_file(PathBuf::from("/file4.md"));
        assert_eq!(settings.recent_files.len(), 3);
        assert!(!settings.recent_files.contains(&PathBuf::from("/file2.md")));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"pdf": {"page_size": "letter"}, "history_limit": 5}"#)
                .unwrap();
        assert_eq!(settings.pdf.page_size, PageSize::Letter);
        assert_eq!(settings.pdf.font_size_pt, 11.0);
        assert_eq!(settings.history_limit, 5);
        assert_eq!(settings.auto_save_delay_ms, 1000);
    }

    #[test]
    fn test_sanitize_clamps_nested_options() {
        let json = r#"{
            "pdf": {"font_size_pt": 100.0, "line_height": 9.0},
            "docx": {"margin_inches": 7.5},
            "beautify": {"wrap_width": 5},
            "history_limit": 0,
            "auto_save_delay_ms": 0,
            "max_recent_files": 1000
        }"#;
        let settings = Settings::from_json_sanitized(json).unwrap();
        assert_eq!(settings.pdf.font_size_pt, 36.0);
        assert_eq!(settings.pdf.line_height, 3.0);
        assert_eq!(settings.docx.margin_inches, 2.5);
        assert_eq!(settings.beautify.wrap_width, 20);
        assert_eq!(settings.history_limit, 1);
        assert_eq!(
            settings.auto_save_delay_ms,
            Settings::MIN_AUTO_SAVE_DELAY_MS
        );
        assert_eq!(settings.max_recent_files, 100);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let result: Result<Settings, _> =
            serde_json::from_str(r#"{"theme": "dark", "future_feature": true}"#);
        assert!(result.is_ok());
    }

    #[test]
    fn test_wrong_types_rejected() {
        let result: Result<Settings, _> = serde_json::from_str(r#"{"history_limit": "many"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip() {
        let mut original = Settings::default();
        original.pdf.theme = PdfTheme::Academic;
        original.beautify.wrap_lines = true;
        original.add_recent_file(PathBuf::from("/notes.md"));

        let json = serde_json::to_string_pretty(&original).unwrap();
        let loaded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(original, loaded);
    }
}
