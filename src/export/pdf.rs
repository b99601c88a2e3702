//! PDF Export
//!
//! Line-oriented PDF rendering. Layout runs first as a pure pass that turns
//! classified lines into positioned draw operations per page; the writer then
//! replays those operations through printpdf.
//!
//! Only block styling is applied. Inline markers are stripped from text, and
//! fenced code blocks are left out of the PDF altogether.

use crate::error::{Error, Result};
use crate::export::metrics::{wrap_to_width, MM_PER_PT};
use crate::export::options::{PdfOptions, Rgb};
use crate::markdown::classify::{classify, split_lines, FenceState, LineClass};
use crate::markdown::inline::strip_inline_markers;
use log::{debug, info};
use printpdf::{BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, Point};

// ─────────────────────────────────────────────────────────────────────────────
// Layout Model
// ─────────────────────────────────────────────────────────────────────────────

/// Space kept free at the bottom of the page before breaking.
const PAGE_BREAK_SLACK_MM: f32 = 10.0;
/// Hanging indent for list items and one nesting level.
const LIST_INDENT_MM: f32 = 5.0;
/// Text inset for blockquotes.
const QUOTE_INDENT_MM: f32 = 8.0;

const QUOTE_TEXT: Rgb = Rgb(0x66, 0x66, 0x66);
const QUOTE_RULE: Rgb = Rgb(0xcc, 0xcc, 0xcc);
const HR_COLOR: Rgb = Rgb(0xe0, 0xe0, 0xe0);

/// One positioned drawing instruction. `y` grows downward from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x_mm: f32,
        y_mm: f32,
        size_pt: f32,
        bold: bool,
        color: Rgb,
        text: String,
    },
    Rule {
        from: (f32, f32),
        to: (f32, f32),
        thickness_mm: f32,
        color: Rgb,
    },
}

/// Draw operations for a single page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub ops: Vec<DrawOp>,
}

/// Vertical cursor plus the pages laid out so far.
struct LayoutCursor<'a> {
    options: &'a PdfOptions,
    page_width: f32,
    page_height: f32,
    y: f32,
    pages: Vec<PageLayout>,
}

impl<'a> LayoutCursor<'a> {
    fn new(options: &'a PdfOptions) -> Self {
        let (page_width, page_height) = options.page_size.dimensions_mm();
        Self {
            options,
            page_width,
            page_height,
            y: options.margin_mm,
            pages: vec![PageLayout::default()],
        }
    }

    fn margin(&self) -> f32 {
        self.options.margin_mm
    }

    fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin()
    }

    /// Body line advance in millimetres.
    fn line_spacing(&self) -> f32 {
        self.options.font_size_pt * 0.35 * self.options.line_height
    }

    fn break_if_needed(&mut self) {
        if self.y > self.page_height - self.margin() - PAGE_BREAK_SLACK_MM {
            self.pages.push(PageLayout::default());
            self.y = self.margin();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Wrap and place a block of text, moving the cursor down one `advance`
    /// per wrapped line and onto a new page whenever the bottom is reached.
    /// Returns the page index and `y` of each placed line.
    fn text_block(
        &mut self,
        text: &str,
        x: f32,
        size_pt: f32,
        bold: bool,
        color: Rgb,
        advance: f32,
    ) -> Vec<(usize, f32)> {
        let max_width = self.content_width() - (x - self.margin());
        let lines = wrap_to_width(text, size_pt, bold, max_width);
        let mut placed = Vec::with_capacity(lines.len());
        for line in lines {
            self.break_if_needed();
            placed.push((self.pages.len() - 1, self.y));
            if !line.is_empty() {
                self.push(DrawOp::Text {
                    x_mm: x,
                    y_mm: self.y,
                    size_pt,
                    bold,
                    color,
                    text: line,
                });
            }
            self.y += advance;
        }
        placed
    }

    fn heading(&mut self, level: u8, text: &str) {
        let base = self.options.font_size_pt;
        let spacing = self.line_spacing();
        // (size multiplier, per-line advance factor, trailing space in line spacings)
        let (scale, advance_factor, after) = match level {
            1 => (2.0, 0.7, 2.0),
            2 => (1.5, 0.55, 1.5),
            3 => (1.2, 0.45, 1.0),
            _ => (1.0, 0.35 * self.options.line_height, 0.5),
        };
        let color = self.options.theme.palette().heading;
        let advance = base * advance_factor;
        let margin = self.margin();
        self.text_block(text, margin, base * scale, true, color, advance);
        self.y += spacing * after;
    }

    fn list_item(&mut self, indent: usize, marker: &str, text: &str) {
        let x = self.margin() + LIST_INDENT_MM * (1 + indent / 2) as f32;
        let spacing = self.line_spacing();
        let color = self.options.theme.palette().text;
        let size = self.options.font_size_pt;
        let body = format!("{}{}", marker, text);
        self.text_block(&body, x, size, false, color, spacing);
    }

    fn blockquote(&mut self, text: &str) {
        let spacing = self.line_spacing();
        let margin = self.margin();
        let size = self.options.font_size_pt;
        let rows = self.text_block(
            text,
            margin + QUOTE_INDENT_MM,
            size,
            false,
            QUOTE_TEXT,
            spacing,
        );

        // One rule per page the quote touches.
        let mut start = 0;
        while start < rows.len() {
            let page = rows[start].0;
            let end = rows[start..]
                .iter()
                .position(|(p, _)| *p != page)
                .map_or(rows.len(), |offset| start + offset);
            let (top, bottom) = (rows[start].1, rows[end - 1].1);
            self.pages[page].ops.push(DrawOp::Rule {
                from: (margin + 2.0, top - spacing * 0.5),
                to: (margin + 2.0, bottom + spacing * 0.5),
                thickness_mm: 0.5,
                color: QUOTE_RULE,
            });
            start = end;
        }
    }

    fn horizontal_rule(&mut self) {
        let margin = self.margin();
        let right = self.page_width - margin;
        let y = self.y;
        self.push(DrawOp::Rule {
            from: (margin, y),
            to: (right, y),
            thickness_mm: 0.3,
            color: HR_COLOR,
        });
        self.y += self.line_spacing();
    }

    fn paragraph(&mut self, text: &str) {
        let spacing = self.line_spacing();
        let margin = self.margin();
        let size = self.options.font_size_pt;
        let color = self.options.theme.palette().text;
        self.text_block(text, margin, size, false, color, spacing);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Lay out a markdown document into pages of draw operations.
pub fn layout_pdf(content: &str, options: &PdfOptions) -> Vec<PageLayout> {
    let mut options = options.clone();
    options.sanitize();
    let mut cursor = LayoutCursor::new(&options);
    let mut fence = FenceState::default();

    for line in split_lines(content) {
        let (class, next) = classify(line, &fence);
        fence = next;

        // Code blocks are not part of the PDF.
        if matches!(class, LineClass::FenceDelimiter { .. } | LineClass::Raw(_)) {
            continue;
        }

        cursor.break_if_needed();
        match class {
            LineClass::Heading { level, text } => {
                cursor.heading(level, &strip_inline_markers(&text));
            }
            LineClass::BulletItem { indent, text } => {
                cursor.list_item(indent, "\u{2022} ", &strip_inline_markers(&text));
            }
            LineClass::TaskItem {
                indent,
                checked,
                text,
            } => {
                let marker = if checked { "[x] " } else { "[ ] " };
                cursor.list_item(indent, marker, &strip_inline_markers(&text));
            }
            LineClass::OrderedItem {
                indent,
                number,
                text,
            } => {
                let marker = format!("{}. ", number);
                cursor.list_item(indent, &marker, &strip_inline_markers(&text));
            }
            LineClass::Blockquote(text) => cursor.blockquote(&strip_inline_markers(&text)),
            LineClass::HorizontalRule => cursor.horizontal_rule(),
            LineClass::Blank => cursor.y += cursor.line_spacing() * 0.5,
            LineClass::Paragraph(text) => cursor.paragraph(&strip_inline_markers(&text)),
            LineClass::FenceDelimiter { .. } | LineClass::Raw(_) => {}
        }
    }

    debug!("PDF layout: {} page(s)", cursor.pages.len());
    cursor.pages
}

// ─────────────────────────────────────────────────────────────────────────────
// Writer
// ─────────────────────────────────────────────────────────────────────────────

fn pdf_error(err: impl std::fmt::Display) -> Error {
    Error::export("PDF", err.to_string())
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        f32::from(rgb.0) / 255.0,
        f32::from(rgb.1) / 255.0,
        f32::from(rgb.2) / 255.0,
        None,
    ))
}

/// Render a markdown document to PDF bytes.
pub fn render_pdf(content: &str, title: &str, options: &PdfOptions) -> Result<Vec<u8>> {
    let pages = layout_pdf(content, options);
    let (width, height) = options.page_size.dimensions_mm();

    let (doc, first_page, first_layer) = PdfDocument::new(title, Mm(width), Mm(height), "Layer 1");
    let regular: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_ref, layer_ref) = doc.add_page(Mm(width), Mm(height), "Layer 1");
            doc.get_page(page_ref).get_layer(layer_ref)
        };

        for op in &page.ops {
            match op {
                DrawOp::Text {
                    x_mm,
                    y_mm,
                    size_pt,
                    bold: is_bold,
                    color,
                    text,
                } => {
                    layer.set_fill_color(to_color(*color));
                    let font = if *is_bold { &bold } else { &regular };
                    layer.use_text(text.as_str(), *size_pt, Mm(*x_mm), Mm(height - y_mm), font);
                }
                DrawOp::Rule {
                    from,
                    to,
                    thickness_mm,
                    color,
                } => {
                    layer.set_outline_color(to_color(*color));
                    layer.set_outline_thickness(thickness_mm / MM_PER_PT);
                    layer.add_line(Line {
                        points: vec![
                            (Point::new(Mm(from.0), Mm(height - from.1)), false),
                            (Point::new(Mm(to.0), Mm(height - to.1)), false),
                        ],
                        is_closed: false,
                    });
                }
            }
        }
    }

    let bytes = doc.save_to_bytes().map_err(pdf_error)?;
    info!(
        "Exported PDF: {} page(s), {} bytes",
        pages.len(),
        bytes.len()
    );
    Ok(bytes)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(pages: &[PageLayout]) -> Vec<String> {
        pages
            .iter()
            .flat_map(|p| p.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                DrawOp::Rule { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_headings_are_bold_and_larger() {
        let pages = layout_pdf("# Big\n## Medium\nbody", &PdfOptions::default());
        let sizes: Vec<(f32, bool)> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { size_pt, bold, .. } => Some((*size_pt, *bold)),
                DrawOp::Rule { .. } => None,
            })
            .collect();
        assert_eq!(sizes, vec![(22.0, true), (16.5, true), (11.0, false)]);
    }

    #[test]
    fn test_inline_markers_stripped() {
        let pages = layout_pdf("**Bold** and [link](http://x)", &PdfOptions::default());
        assert_eq!(texts(&pages), vec!["Bold and link".to_string()]);
    }

    #[test]
    fn test_code_blocks_skipped() {
        let pages = layout_pdf(
            "before\n```rust\nlet x = 1;\n```\nafter",
            &PdfOptions::default(),
        );
        assert_eq!(
            texts(&pages),
            vec!["before".to_string(), "after".to_string()]
        );
    }

    #[test]
    fn test_list_markers_and_indent() {
        let pages = layout_pdf("- a\n  - b\n3. c\n- [x] d", &PdfOptions::default());
        let ops: Vec<(f32, String)> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x_mm, text, .. } => Some((*x_mm, text.clone())),
                DrawOp::Rule { .. } => None,
            })
            .collect();
        assert_eq!(ops[0], (25.0, "\u{2022} a".to_string()));
        assert_eq!(ops[1], (30.0, "\u{2022} b".to_string()));
        assert_eq!(ops[2], (25.0, "3. c".to_string()));
        assert_eq!(ops[3], (25.0, "[x] d".to_string()));
    }

    #[test]
    fn test_blockquote_and_rule_draw_lines() {
        let pages = layout_pdf("> quoted\n---", &PdfOptions::default());
        let rules = pages[0]
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rule { .. }))
            .count();
        assert_eq!(rules, 2);
        assert!(pages[0].ops.iter().any(|op| matches!(
            op,
            DrawOp::Text { color, .. } if *color == QUOTE_TEXT
        )));
    }

    #[test]
    fn test_page_breaks() {
        let content = "line\n".repeat(200);
        let pages = layout_pdf(&content, &PdfOptions::default());
        assert!(pages.len() > 1);
        let options = PdfOptions::default();
        let (_, height) = options.page_size.dimensions_mm();
        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Text { y_mm, .. } = op {
                    assert!(*y_mm >= options.margin_mm);
                    assert!(*y_mm <= height - options.margin_mm);
                }
            }
        }
    }

    #[test]
    fn test_long_paragraph_wraps_onto_new_pages() {
        let content = "word ".repeat(3000);
        let options = PdfOptions::default();
        let pages = layout_pdf(&content, &options);
        assert!(pages.len() > 1);

        let (_, height) = options.page_size.dimensions_mm();
        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Text { y_mm, .. } = op {
                    assert!(*y_mm <= height - options.margin_mm);
                }
            }
        }
        let words: usize = texts(&pages)
            .iter()
            .map(|t| t.split_whitespace().count())
            .sum();
        assert_eq!(words, 3000);
    }

    #[test]
    fn test_long_quote_gets_a_rule_on_each_page() {
        let content = format!("> {}", "quoted ".repeat(3000));
        let pages = layout_pdf(&content, &PdfOptions::default());
        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.ops.iter().any(|op| matches!(op, DrawOp::Rule { .. })));
        }
    }

    #[test]
    fn test_render_pdf_bytes() {
        let bytes = render_pdf("# Title\n\nHello", "Title", &PdfOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
