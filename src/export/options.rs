//! Export Options and Configuration
//!
//! This module defines the export formats and the per-backend options that
//! are persisted in user settings.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Export Format
// ─────────────────────────────────────────────────────────────────────────────

/// Supported export formats for documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Paginated PDF with block-level styling only
    #[default]
    Pdf,
    /// Office Open XML word-processing document with inline styling
    Docx,
    /// Standalone HTML file with embedded styles
    Html,
}

impl ExportFormat {
    /// Get the display label for this format.
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Docx => "DOCX",
            ExportFormat::Html => "HTML",
        }
    }

    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Html => "html",
        }
    }

    /// MIME type of the produced artifact.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Html => "text/html",
        }
    }

    /// Get all available export formats.
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Pdf, ExportFormat::Docx, ExportFormat::Html]
    }

    /// Parse a format name or extension.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(ExportFormat::Pdf),
            "docx" | "word" => Some(ExportFormat::Docx),
            "html" | "htm" => Some(ExportFormat::Html),
            _ => None,
        }
    }
}

/// Output file name for an export: a trailing `.md`, `.markdown` or `.txt`
/// is replaced by the format's extension.
pub fn export_file_name(document_name: &str, format: ExportFormat) -> String {
    let lower = document_name.to_ascii_lowercase();
    let stem = [".markdown", ".md", ".txt"]
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map_or(document_name, |ext| {
            &document_name[..document_name.len() - ext.len()]
        });
    format!("{}.{}", stem, format.extension())
}

// ─────────────────────────────────────────────────────────────────────────────
// Page Setup
// ─────────────────────────────────────────────────────────────────────────────

/// Paper size shared by the PDF and DOCX backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Width and height in millimetres.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (216.0, 279.0),
            PageSize::Legal => (216.0, 356.0),
        }
    }

    /// Width and height in twentieths of a point (DOCX units).
    pub fn dimensions_twips(&self) -> (u32, u32) {
        match self {
            PageSize::A4 => (11906, 16838),
            PageSize::Letter => (12240, 15840),
            PageSize::Legal => (12240, 20160),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(PageSize::A4),
            "letter" => Some(PageSize::Letter),
            "legal" => Some(PageSize::Legal),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PDF Options
// ─────────────────────────────────────────────────────────────────────────────

/// Colour scheme for PDF output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PdfTheme {
    #[default]
    Professional,
    Academic,
    Minimal,
}

/// An RGB colour, components in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Hex form without `#`, as DOCX expects.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Colours used for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub heading: Rgb,
    pub text: Rgb,
    pub code: Rgb,
}

impl PdfTheme {
    pub fn palette(&self) -> ThemePalette {
        match self {
            PdfTheme::Professional => ThemePalette {
                heading: Rgb(0x00, 0x66, 0xcc),
                text: Rgb(0x1a, 0x1a, 0x1a),
                code: Rgb(0xf6, 0xf8, 0xfa),
            },
            PdfTheme::Academic => ThemePalette {
                heading: Rgb(0x33, 0x33, 0x33),
                text: Rgb(0x1a, 0x1a, 0x1a),
                code: Rgb(0xf0, 0xf0, 0xf0),
            },
            PdfTheme::Minimal => ThemePalette {
                heading: Rgb(0x00, 0x00, 0x00),
                text: Rgb(0x33, 0x33, 0x33),
                code: Rgb(0xff, 0xff, 0xff),
            },
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "professional" => Some(PdfTheme::Professional),
            "academic" => Some(PdfTheme::Academic),
            "minimal" => Some(PdfTheme::Minimal),
            _ => None,
        }
    }
}

/// Options for the PDF backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOptions {
    pub theme: PdfTheme,
    pub page_size: PageSize,
    /// Page margin in millimetres
    pub margin_mm: f32,
    /// Body font size in points
    pub font_size_pt: f32,
    /// Line height multiplier
    pub line_height: f32,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            theme: PdfTheme::default(),
            page_size: PageSize::default(),
            margin_mm: 20.0,
            font_size_pt: 11.0,
            line_height: 1.5,
        }
    }
}

/// Accepted font size range in points.
pub const MIN_FONT_SIZE: f32 = 6.0;
pub const MAX_FONT_SIZE: f32 = 36.0;

impl PdfOptions {
    /// Clamp numeric fields into their valid ranges.
    pub fn sanitize(&mut self) {
        self.margin_mm = finite_or(self.margin_mm, 20.0).clamp(5.0, 60.0);
        self.font_size_pt = finite_or(self.font_size_pt, 11.0).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.line_height = finite_or(self.line_height, 1.5).clamp(1.0, 3.0);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DOCX Options
// ─────────────────────────────────────────────────────────────────────────────

/// Options for the DOCX backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocxOptions {
    pub page_size: PageSize,
    /// Page margin in inches
    pub margin_inches: f32,
}

impl Default for DocxOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margin_inches: 1.0,
        }
    }
}

impl DocxOptions {
    pub fn sanitize(&mut self) {
        self.margin_inches = finite_or(self.margin_inches, 1.0).clamp(0.0, 2.5);
    }

    /// Margin in twentieths of a point.
    pub fn margin_twips(&self) -> u32 {
        (self.margin_inches * 1440.0).round() as u32
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Options
// ─────────────────────────────────────────────────────────────────────────────

/// Amount of embedded CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HtmlStyle {
    /// Complete typography for every element
    #[default]
    Full,
    /// Colours and body layout only
    Minimal,
}

/// Options for the HTML backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlOptions {
    /// Emit a `prefers-color-scheme: dark` override
    pub include_dark_mode: bool,
    pub style: HtmlStyle,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            include_dark_mode: true,
            style: HtmlStyle::default(),
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_default() {
        assert_eq!(ExportFormat::default(), ExportFormat::Pdf);
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
        assert_eq!(ExportFormat::Docx.extension(), "docx");
        assert_eq!(ExportFormat::Html.extension(), "html");
        assert_eq!(ExportFormat::from_name("HTM"), Some(ExportFormat::Html));
        assert_eq!(ExportFormat::from_name("odt"), None);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("notes.md", ExportFormat::Pdf), "notes.pdf");
        assert_eq!(
            export_file_name("Notes.Markdown", ExportFormat::Docx),
            "Notes.docx"
        );
        assert_eq!(export_file_name("a.txt", ExportFormat::Html), "a.html");
        assert_eq!(export_file_name("plain", ExportFormat::Pdf), "plain.pdf");
        assert_eq!(export_file_name("v1.2.md", ExportFormat::Pdf), "v1.2.pdf");
    }

    #[test]
    fn test_page_dimensions() {
        assert_eq!(PageSize::A4.dimensions_mm(), (210.0, 297.0));
        assert_eq!(PageSize::Legal.dimensions_mm(), (216.0, 356.0));
        assert_eq!(PageSize::Letter.dimensions_twips(), (12240, 15840));
    }

    #[test]
    fn test_pdf_sanitize() {
        let mut options = PdfOptions {
            margin_mm: 500.0,
            font_size_pt: f32::NAN,
            line_height: 0.2,
            ..PdfOptions::default()
        };
        options.sanitize();
        assert_eq!(options.margin_mm, 60.0);
        assert_eq!(options.font_size_pt, 11.0);
        assert_eq!(options.line_height, 1.0);
    }

    #[test]
    fn test_docx_margin_twips() {
        let options = DocxOptions::default();
        assert_eq!(options.margin_twips(), 1440);
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(PdfTheme::Professional.palette().heading.hex(), "0066CC");
    }

    #[test]
    fn test_options_serialization() {
        let json = r#"{"theme":"academic","page_size":"legal"}"#;
        let options: PdfOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.theme, PdfTheme::Academic);
        assert_eq!(options.page_size, PageSize::Legal);
        assert_eq!(options.font_size_pt, 11.0);

        let html = HtmlOptions::default();
        let back: HtmlOptions =
            serde_json::from_str(&serde_json::to_string(&html).unwrap()).unwrap();
        assert_eq!(html, back);
    }
}
