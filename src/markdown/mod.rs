//! Markdown text processing
//!
//! Two independent views of the same text live here:
//!
//! - a line-oriented subset recognizer ([`classify`], [`inline`]) used by the
//!   PDF/DOCX exporters, the beautifier and the outline, which never builds a
//!   parse tree;
//! - a full CommonMark + GFM renderer ([`render_to_html`]) backed by comrak,
//!   used only for HTML output.
//!
//! The two are allowed to disagree on edge cases.
//!
//! # Example
//! ```ignore
//! use downedit::markdown::{beautify, classify_document, parse_inline, BeautifyOptions};
//!
//! let classes = classify_document("# Hello\n\n- item");
//! let runs = parse_inline("**bold** and *italic*");
//! let tidy = beautify("Title\n===\n", &BeautifyOptions::default());
//! ```

pub mod beautify;
pub mod classify;
pub mod formatting;
pub mod inline;
pub mod outline;
mod parser;
pub mod table;

pub use beautify::{beautify, BeautifyOptions};
pub use classify::{classify, classify_document, FenceState, LineClass};
pub use formatting::{apply_format, FormatCommand, FormatResult};
pub use inline::{parse_inline, strip_inline_markers, InlineRun};
pub use outline::{extract_outline, heading_anchor, OutlineHeading};
pub use parser::{render_to_html, MarkdownOptions};
pub use table::{generate_table_markdown, Alignment, TableSpec};
