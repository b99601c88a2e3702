//! Word / HTML Import
//!
//! Three-stage pipeline turning a Word document into markdown:
//!
//! 1. `docx_reader` - `.docx` package → HTML, headings from the style map
//! 2. `html_to_markdown` - HTML → markdown with the import rule set
//! 3. `postprocess` - spacing normalisation
//!
//! Converter warnings are returned alongside the markdown. Only an input that
//! cannot be read at all is an error.

mod docx_reader;
mod html_to_markdown;
mod postprocess;

pub use docx_reader::docx_to_html;
pub use html_to_markdown::html_to_markdown;
pub use postprocess::postprocess;

use crate::error::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for the Word import pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Embed images as base64 data URIs instead of dropping them
    pub preserve_images: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            preserve_images: true,
        }
    }
}

/// Markdown produced by an import plus anything the converters flagged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub markdown: String,
    pub warnings: Vec<String>,
}

impl ImportResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Convert a `.docx` file's bytes to markdown.
pub fn import_word(bytes: &[u8], options: &ImportOptions) -> Result<ImportResult> {
    let (html, warnings) = docx_to_html(bytes, options)?;
    for warning in &warnings {
        warn!("Word import: {}", warning);
    }
    let markdown = postprocess(&html_to_markdown(&html)?);
    info!(
        "Imported Word document: {} bytes of markdown, {} warning(s)",
        markdown.len(),
        warnings.len()
    );
    Ok(ImportResult { markdown, warnings })
}

/// Run stages 2 and 3 on an HTML string.
pub fn import_html(html: &str) -> Result<ImportResult> {
    let markdown = postprocess(&html_to_markdown(html)?);
    info!("Imported HTML: {} bytes of markdown", markdown.len());
    Ok(ImportResult {
        markdown,
        warnings: Vec::new(),
    })
}

/// Document name for an imported file: its stem with a `.md` extension.
pub fn imported_file_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Imported".to_string());
    format!("{}.md", stem)
}
