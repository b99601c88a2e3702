//! Downedit - markdown editing core
//!
//! Line classification and inline spans, PDF/DOCX/HTML export, Word import,
//! the beautifier and the document store with history and restart
//! snapshots. No rendering surface: front ends talk to [`app::DowneditApp`]
//! and supply file and dialog collaborators.

pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod files;
pub mod history;
pub mod import;
pub mod markdown;
pub mod state;
pub mod stats;
pub mod storage;
pub mod string_utils;
pub mod timers;

pub use app::{DowneditApp, ImportOutcome, TickOutcome};
pub use config::Settings;
pub use error::{Error, Result};
pub use export::{export_document, ExportArtifact, ExportFormat};
pub use import::{import_html, import_word, ImportOptions, ImportResult};
pub use markdown::{beautify, BeautifyOptions};
pub use state::{CloseOutcome, Document, DocumentStore, EditorView};
