//! DOCX Export
//!
//! Builds a flat list of Word paragraphs from classified lines, then hands
//! them to docx-rs for packaging. This is the only backend that keeps inline
//! formatting: paragraph text is split into [`InlineRun`]s and each run gets
//! its own bold / italic / code font / link styling.
//!
//! Fenced code blocks are collected while the fence is open and emitted as a
//! single shaded monospace paragraph when it closes, or at end of input when
//! the fence is never closed.

use crate::error::{Error, Result};
use crate::export::options::DocxOptions;
use crate::markdown::classify::{classify, split_lines, FenceState, LineClass};
use crate::markdown::inline::{parse_inline, InlineRun};
use docx_rs::{
    AbstractNumbering, BorderType, BreakType, Docx, Hyperlink, HyperlinkType, IndentLevel, Level,
    LevelJc, LevelText, LineSpacing, NumberFormat, Numbering, NumberingId, PageMargin, Paragraph,
    ParagraphBorder, ParagraphBorderPosition, ParagraphBorders, Run, RunFonts, Shading,
    SpecialIndentType, Start, Style, StyleType,
};
use log::{debug, info};
use std::io::Cursor;

// ─────────────────────────────────────────────────────────────────────────────
// Block Model
// ─────────────────────────────────────────────────────────────────────────────

/// Deepest heading level Word output uses; deeper headings are clamped.
pub const MAX_DOCX_HEADING: u8 = 4;

const CODE_FONT: &str = "Consolas";
const LINK_COLOR: &str = "0066CC";
const QUOTE_COLOR: &str = "666666";

/// One Word paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocxBlock {
    Heading {
        level: u8,
        text: String,
    },
    Bullet {
        level: u8,
        runs: Vec<InlineRun>,
    },
    Numbered {
        level: u8,
        runs: Vec<InlineRun>,
    },
    Task {
        level: u8,
        checked: bool,
        runs: Vec<InlineRun>,
    },
    Quote(String),
    Rule,
    /// Newline-joined code block content
    Code(String),
    Paragraph(Vec<InlineRun>),
    Empty,
}

fn list_level(indent: usize) -> u8 {
    (indent / 2).min(8) as u8
}

/// Convert a markdown document into Word paragraphs.
pub fn layout_docx(content: &str) -> Vec<DocxBlock> {
    let mut blocks = Vec::new();
    let mut fence = FenceState::default();
    let mut code_lines: Option<Vec<String>> = None;

    for line in split_lines(content) {
        let (class, next) = classify(line, &fence);
        fence = next;

        match class {
            LineClass::FenceDelimiter { opening: true, .. } => {
                code_lines = Some(Vec::new());
            }
            LineClass::FenceDelimiter { opening: false, .. } => {
                let lines = code_lines.take().unwrap_or_default();
                blocks.push(DocxBlock::Code(lines.join("\n")));
            }
            LineClass::Raw(text) => {
                code_lines.get_or_insert_with(Vec::new).push(text);
            }
            LineClass::Heading { level, text } => blocks.push(DocxBlock::Heading {
                level: level.min(MAX_DOCX_HEADING),
                text,
            }),
            LineClass::BulletItem { indent, text } => blocks.push(DocxBlock::Bullet {
                level: list_level(indent),
                runs: parse_inline(&text),
            }),
            LineClass::OrderedItem { indent, text, .. } => blocks.push(DocxBlock::Numbered {
                level: list_level(indent),
                runs: parse_inline(&text),
            }),
            LineClass::TaskItem {
                indent,
                checked,
                text,
            } => blocks.push(DocxBlock::Task {
                level: list_level(indent),
                checked,
                runs: parse_inline(&text),
            }),
            LineClass::Blockquote(text) => blocks.push(DocxBlock::Quote(text)),
            LineClass::HorizontalRule => blocks.push(DocxBlock::Rule),
            LineClass::Blank => blocks.push(DocxBlock::Empty),
            LineClass::Paragraph(text) => blocks.push(DocxBlock::Paragraph(parse_inline(&text))),
        }
    }

    // Unterminated fence: keep what was collected.
    if let Some(lines) = code_lines {
        debug!(
            "DOCX: flushing unterminated code block ({} lines)",
            lines.len()
        );
        blocks.push(DocxBlock::Code(lines.join("\n")));
    }

    blocks
}

// ─────────────────────────────────────────────────────────────────────────────
// Word Document
// ─────────────────────────────────────────────────────────────────────────────

const BULLET_NUM_ID: usize = 2;
const DECIMAL_NUM_ID: usize = 3;
/// Deepest list level defined in the numbering part.
const LIST_LEVELS: usize = 9;

const HEADING_SIZES: [(u8, usize); 4] = [(1, 32), (2, 28), (3, 24), (4, 22)];

fn code_fonts() -> RunFonts {
    RunFonts::new()
        .ascii(CODE_FONT)
        .hi_ansi(CODE_FONT)
        .cs(CODE_FONT)
}

/// A run holding `text`; newlines become line breaks inside the run.
fn text_run(text: &str) -> Run {
    let mut run = Run::new();
    for (i, part) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(part);
    }
    run
}

fn add_inline_runs(mut paragraph: Paragraph, runs: &[InlineRun]) -> Paragraph {
    for run in runs {
        paragraph = match run {
            InlineRun::PlainText(text) => paragraph.add_run(text_run(text)),
            InlineRun::Bold(text) => paragraph.add_run(text_run(text).bold()),
            InlineRun::Italic(text) => paragraph.add_run(text_run(text).italic()),
            InlineRun::Code(text) => paragraph.add_run(text_run(text).fonts(code_fonts())),
            InlineRun::Link { text, target } => paragraph.add_hyperlink(
                Hyperlink::new(target.as_str(), HyperlinkType::External)
                    .add_run(text_run(text).color(LINK_COLOR).underline("single")),
            ),
        };
    }
    paragraph
}

fn list_paragraph(num_id: usize, level: u8) -> Paragraph {
    Paragraph::new().numbering(
        NumberingId::new(num_id),
        IndentLevel::new(usize::from(level)),
    )
}

fn block_paragraph(block: &DocxBlock) -> Paragraph {
    match block {
        DocxBlock::Heading { level, text } => {
            let (before, after) = match level {
                1 => (240, 120),
                2 => (200, 100),
                3 => (160, 80),
                _ => (120, 60),
            };
            Paragraph::new()
                .style(&format!("Heading{}", level))
                .line_spacing(LineSpacing::new().before(before).after(after))
                .add_run(text_run(text))
        }
        DocxBlock::Bullet { level, runs } => {
            add_inline_runs(list_paragraph(BULLET_NUM_ID, *level), runs)
        }
        DocxBlock::Numbered { level, runs } => {
            add_inline_runs(list_paragraph(DECIMAL_NUM_ID, *level), runs)
        }
        DocxBlock::Task {
            level,
            checked,
            runs,
        } => {
            let mark = if *checked { "\u{2612} " } else { "\u{2610} " };
            let paragraph = list_paragraph(BULLET_NUM_ID, *level).add_run(text_run(mark));
            add_inline_runs(paragraph, runs)
        }
        DocxBlock::Quote(text) => Paragraph::new()
            .set_borders(
                ParagraphBorders::with_empty().set(
                    ParagraphBorder::new(ParagraphBorderPosition::Left)
                        .val(BorderType::Single)
                        .size(12)
                        .space(4)
                        .color("CCCCCC"),
                ),
            )
            .indent(Some(720), None, None, None)
            .add_run(text_run(text).italic().color(QUOTE_COLOR)),
        DocxBlock::Rule => Paragraph::new()
            .set_borders(
                ParagraphBorders::with_empty().set(
                    ParagraphBorder::new(ParagraphBorderPosition::Bottom)
                        .val(BorderType::Single)
                        .size(6)
                        .space(1)
                        .color("E0E0E0"),
                ),
            )
            .line_spacing(LineSpacing::new().before(200).after(200)),
        DocxBlock::Code(code) => Paragraph::new()
            .line_spacing(LineSpacing::new().before(100).after(100))
            .add_run(
                text_run(code)
                    .fonts(code_fonts())
                    .size(20)
                    .shading(Shading::new().fill("F0F0F0")),
            ),
        DocxBlock::Paragraph(runs) => add_inline_runs(
            Paragraph::new().line_spacing(LineSpacing::new().after(120)),
            runs,
        ),
        DocxBlock::Empty => Paragraph::new(),
    }
}

fn list_numbering(abstract_id: usize, ordered: bool) -> AbstractNumbering {
    (0..LIST_LEVELS).fold(AbstractNumbering::new(abstract_id), |numbering, lvl| {
        let (format, text) = if ordered {
            ("decimal", format!("%{}.", lvl + 1))
        } else {
            (
                "bullet",
                ["\u{2022}", "\u{25E6}", "\u{25AA}"][lvl % 3].to_string(),
            )
        };
        numbering.add_level(
            Level::new(
                lvl,
                Start::new(1),
                NumberFormat::new(format),
                LevelText::new(text),
                LevelJc::new("left"),
            )
            .indent(
                Some(720 * (lvl as i32 + 1)),
                Some(SpecialIndentType::Hanging(360)),
                None,
                None,
            ),
        )
    })
}

fn heading_style(level: u8, half_points: usize) -> Style {
    Style::new(&format!("Heading{}", level), StyleType::Paragraph)
        .name(&format!("heading {}", level))
        .based_on("Normal")
        .next("Normal")
        .size(half_points)
        .bold()
}

/// Assemble the Word document for a list of blocks.
fn build_document(blocks: &[DocxBlock], options: &DocxOptions) -> Docx {
    let (width, height) = options.page_size.dimensions_twips();
    let margin = options.margin_twips() as i32;

    let mut docx = Docx::new()
        .page_size(width, height)
        .page_margin(
            PageMargin::new()
                .top(margin)
                .right(margin)
                .bottom(margin)
                .left(margin),
        )
        .add_abstract_numbering(list_numbering(BULLET_NUM_ID, false))
        .add_abstract_numbering(list_numbering(DECIMAL_NUM_ID, true))
        .add_numbering(Numbering::new(BULLET_NUM_ID, BULLET_NUM_ID))
        .add_numbering(Numbering::new(DECIMAL_NUM_ID, DECIMAL_NUM_ID));
    for (level, size) in HEADING_SIZES {
        docx = docx.add_style(heading_style(level, size));
    }
    blocks.iter().fold(docx, |docx, block| {
        docx.add_paragraph(block_paragraph(block))
    })
}

fn docx_error(err: impl std::fmt::Display) -> Error {
    Error::export("DOCX", err.to_string())
}

/// Render a markdown document to DOCX bytes.
pub fn render_docx(content: &str, title: &str, options: &DocxOptions) -> Result<Vec<u8>> {
    let mut options = options.clone();
    options.sanitize();
    let blocks = layout_docx(content);

    let mut cursor = Cursor::new(Vec::new());
    build_document(&blocks, &options)
        .build()
        .pack(&mut cursor)
        .map_err(docx_error)?;
    let bytes = cursor.into_inner();

    info!(
        "Exported DOCX '{}': {} paragraph(s), {} bytes",
        title,
        blocks.len(),
        bytes.len()
    );
    Ok(bytes)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
