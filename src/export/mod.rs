//! Document Export Module
//!
//! Converts a markdown document into a PDF, DOCX or standalone HTML artifact.
//!
//! # Architecture
//!
//! - `options.rs` - Export formats and per-backend options
//! - `pdf.rs` - Line-oriented PDF layout and writer
//! - `metrics.rs` - Helvetica advance widths used to wrap PDF text
//! - `docx.rs` - Flat Word paragraph list with inline run styling
//! - `html.rs` - Full markdown renderer wrapped in a styled HTML page
//!
//! The PDF and DOCX backends share the line classifier and recognise only a
//! subset of markdown; the HTML backend goes through the full renderer.

pub mod docx;
pub mod html;
pub mod metrics;
pub mod options;
pub mod pdf;

pub use docx::{layout_docx, render_docx, DocxBlock};
pub use html::render_html;
pub use options::{
    export_file_name, DocxOptions, ExportFormat, HtmlOptions, HtmlStyle, PageSize, PdfOptions,
    PdfTheme,
};
pub use pdf::{layout_pdf, render_pdf, DrawOp, PageLayout};

use crate::config::Settings;
use crate::error::Result;

/// A rendered export ready to be handed to the file collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render `content` in the requested format using the options in `settings`.
///
/// `document_name` is used for the output file name and as the document
/// title.
pub fn export_document(
    content: &str,
    document_name: &str,
    format: ExportFormat,
    settings: &Settings,
) -> Result<ExportArtifact> {
    let bytes = match format {
        ExportFormat::Pdf => render_pdf(content, document_name, &settings.pdf)?,
        ExportFormat::Docx => render_docx(content, document_name, &settings.docx)?,
        ExportFormat::Html => render_html(content, document_name, &settings.html).into_bytes(),
    };

    Ok(ExportArtifact {
        file_name: export_file_name(document_name, format),
        mime_type: format.mime_type(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_document_dispatch() {
        let settings = Settings::default();
        let html = export_document("# Hi", "notes.md", ExportFormat::Html, &settings).unwrap();
        assert_eq!(html.file_name, "notes.html");
        assert_eq!(html.mime_type, "text/html");
        assert!(String::from_utf8(html.bytes)
            .unwrap()
            .contains("<title>notes.md</title>"));

        let pdf = export_document("# Hi", "notes.md", ExportFormat::Pdf, &settings).unwrap();
        assert_eq!(pdf.file_name, "notes.pdf");
        assert!(pdf.bytes.starts_with(b"%PDF"));

        let docx = export_document("# Hi", "notes.md", ExportFormat::Docx, &settings).unwrap();
        assert_eq!(docx.file_name, "notes.docx");
        assert!(docx.bytes.starts_with(b"PK"));
    }
}
