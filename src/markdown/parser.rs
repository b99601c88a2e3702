//! Full markdown rendering boundary using comrak
//!
//! This is the only place the crate talks to a complete CommonMark + GFM
//! parser. It renders HTML for the HTML export backend. The line-oriented
//! pipelines (classifier, beautifier, PDF/DOCX export, Word import) never see
//! comrak types.

use comrak::{markdown_to_html, Options};

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for markdown rendering.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Enable footnotes
    pub footnotes: bool,
    /// Render single newlines inside paragraphs as `<br>`
    pub hard_breaks: bool,
    /// Pass raw HTML through untouched
    pub allow_raw_html: bool,
    /// Generate GitHub-style heading IDs with this prefix
    pub header_ids: Option<String>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            footnotes: true,
            hard_breaks: true,
            allow_raw_html: true,
            header_ids: Some(String::new()),
        }
    }
}

impl MarkdownOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        // Extension options
        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.footnotes = self.footnotes;
        options.extension.header_ids = self.header_ids.clone();

        // Render options
        options.render.hardbreaks = self.hard_breaks;
        options.render.unsafe_ = self.allow_raw_html;

        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Render markdown to an HTML fragment.
pub fn render_to_html(markdown: &str, options: &MarkdownOptions) -> String {
    markdown_to_html(markdown, &options.to_comrak_options())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
