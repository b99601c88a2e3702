//! Markdown beautifier
//!
//! A batch, multi-pass line rewriter. Each pass is independently switchable
//! and they always run in the same order, since later passes rely on the
//! normalization done by earlier ones:
//!
//! 1. strip trailing whitespace
//! 2. Setext → ATX headings (two-line lookahead)
//! 3. exactly one space after ATX hashes
//! 4. list marker character and spacing
//! 5. list indentation quantized to 2 spaces
//! 6. blank-line normalization and spacing around headings
//! 7. greedy word wrap
//!
//! Passes 2–7 never touch the content of a fenced code block.
//! Running the beautifier on its own output changes nothing.

use crate::markdown::classify::{
    classify, indent_width, split_indent, split_lines, FenceState, LineClass,
};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Narrowest and widest accepted wrap width.
pub const MIN_WRAP_WIDTH: usize = 20;
pub const MAX_WRAP_WIDTH: usize = 200;

/// Switches for the beautifier passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeautifyOptions {
    /// Setext → ATX and `#` spacing
    pub normalize_headings: bool,
    /// Rewrite bullet markers to `list_marker`
    pub normalize_lists: bool,
    /// Bullet marker to use: `-`, `*` or `+`
    pub list_marker: char,
    /// Collapse blank runs and pad headings with blank lines
    pub fix_spacing: bool,
    /// Quantize list indentation to multiples of two spaces
    pub indent_lists: bool,
    /// Greedy-wrap paragraph lines
    pub wrap_lines: bool,
    /// Column limit for `wrap_lines`
    pub wrap_width: usize,
    /// Strip trailing whitespace
    pub remove_trailing: bool,
}

impl Default for BeautifyOptions {
    fn default() -> Self {
        Self {
            normalize_headings: true,
            normalize_lists: true,
            list_marker: '-',
            fix_spacing: true,
            indent_lists: true,
            wrap_lines: false,
            wrap_width: 80,
            remove_trailing: true,
        }
    }
}

impl BeautifyOptions {
    /// Clamp values into their valid ranges.
    pub fn sanitize(&mut self) {
        if !matches!(self.list_marker, '-' | '*' | '+') {
            self.list_marker = '-';
        }
        self.wrap_width = self.wrap_width.clamp(MIN_WRAP_WIDTH, MAX_WRAP_WIDTH);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

/// Beautify a markdown document.
pub fn beautify(content: &str, options: &BeautifyOptions) -> String {
    let mut options = options.clone();
    options.sanitize();

    let mut lines: Vec<String> = split_lines(content).map(str::to_string).collect();
    let before = lines.len();

    if options.remove_trailing {
        for line in &mut lines {
            let kept = line.trim_end().len();
            line.truncate(kept);
        }
    }
    if options.normalize_headings {
        lines = convert_setext_headings(lines);
        map_outside_fences(&mut lines, normalize_atx_spacing);
    }
    if options.normalize_lists {
        let marker = options.list_marker;
        map_outside_fences(&mut lines, |line| normalize_list_marker(line, marker));
    }
    if options.indent_lists {
        map_outside_fences(&mut lines, quantize_list_indent);
    }
    if options.fix_spacing {
        lines = normalize_blank_lines(lines);
    }
    if options.wrap_lines {
        lines = wrap_paragraphs(lines, options.wrap_width);
    }

    debug!("Beautify: {} lines in, {} lines out", before, lines.len());
    let output = lines.join("\n");
    info!(
        "Beautified document ({} bytes, {})",
        output.len(),
        if output == content {
            "unchanged"
        } else {
            "changed"
        }
    );
    output
}

// ─────────────────────────────────────────────────────────────────────────────
// Fence Tracking
// ─────────────────────────────────────────────────────────────────────────────

/// Classify every line, threading fence state.
fn classify_all(lines: &[String]) -> Vec<LineClass> {
    let mut fence = FenceState::default();
    lines
        .iter()
        .map(|line| {
            let (class, next) = classify(line, &fence);
            fence = next;
            class
        })
        .collect()
}

fn is_fence_line(class: &LineClass) -> bool {
    matches!(class, LineClass::FenceDelimiter { .. } | LineClass::Raw(_))
}

/// Rewrite every line that is not a fence delimiter or fence content.
fn map_outside_fences(lines: &mut [String], rewrite: impl Fn(&str) -> Option<String>) {
    let mut fence = FenceState::default();
    for line in lines.iter_mut() {
        let (class, next) = classify(line, &fence);
        fence = next;
        if is_fence_line(&class) {
            continue;
        }
        if let Some(new_line) = rewrite(line) {
            *line = new_line;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Headings
// ─────────────────────────────────────────────────────────────────────────────

fn is_underline(line: &str, ch: char) -> bool {
    let t = line.trim();
    !t.is_empty() && t.chars().all(|c| c == ch)
}

/// Convert Setext headings to ATX.
///
/// A text line followed by `===` becomes `# text`; followed by `---` it
/// becomes `## text` unless the text line is itself a list item. The
/// underline line is dropped. ATX heading lines and fence content are left
/// alone.
fn convert_setext_headings(lines: Vec<String>) -> Vec<String> {
    let classes = classify_all(&lines);
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        let candidate = matches!(
            classes[i],
            LineClass::Paragraph(_) | LineClass::Blockquote(_)
        ) || classes[i].is_list_item();
        if candidate && i + 1 < lines.len() && !is_fence_line(&classes[i + 1]) {
            let next = &lines[i + 1];
            let level = if is_underline(next, '=') {
                Some(1)
            } else if is_underline(next, '-') && !classes[i].is_list_item() {
                Some(2)
            } else {
                None
            };
            if let Some(level) = level {
                out.push(format!("{} {}", "#".repeat(level), line.trim()));
                i += 2;
                continue;
            }
        }
        out.push(line.clone());
        i += 1;
    }

    out
}

static ATX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})[ \t]*([^#\s].*)$").expect("ATX_RE: hardcoded regex is valid")
});

/// `##Title` / `##   Title` → `## Title`.
fn normalize_atx_spacing(line: &str) -> Option<String> {
    let caps = ATX_RE.captures(line)?;
    let fixed = format!("{} {}", &caps[1], &caps[2]);
    (fixed != line).then_some(fixed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)[-*+][ \t]+(.*)$").expect("BULLET_RE: hardcoded regex is valid")
});

static ORDERED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)(\d+\.)[ \t]+(.*)$").expect("ORDERED_RE: hardcoded regex is valid")
});

/// Rewrite the bullet character and force a single space after markers.
fn normalize_list_marker(line: &str, marker: char) -> Option<String> {
    let fixed = if let Some(caps) = BULLET_RE.captures(line) {
        format!("{}{} {}", &caps[1], marker, &caps[2])
    } else if let Some(caps) = ORDERED_RE.captures(line) {
        format!("{}{} {}", &caps[1], &caps[2], &caps[3])
    } else {
        return None;
    };
    (fixed != line).then_some(fixed)
}

/// Round list indentation down to a multiple of two spaces.
fn quantize_list_indent(line: &str) -> Option<String> {
    let (lead, rest) = split_indent(line);
    if lead.is_empty() {
        return None;
    }
    let (class, _) = classify(line, &FenceState::default());
    if !class.is_list_item() {
        return None;
    }
    let width = indent_width(lead) / 2 * 2;
    let fixed = format!("{}{}", " ".repeat(width), rest);
    (fixed != line).then_some(fixed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Blank Lines
// ─────────────────────────────────────────────────────────────────────────────

/// Collapse blank runs to one line and surround headings with blank lines.
/// Lines inside fences pass through untouched.
fn normalize_blank_lines(lines: Vec<String>) -> Vec<String> {
    let classes = classify_all(&lines);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut need_blank = false;

    for (line, class) in lines.into_iter().zip(classes) {
        if matches!(class, LineClass::Raw(_)) {
            out.push(line);
            continue;
        }
        let last_blank = out.last().map_or(true, |l| l.trim().is_empty());

        if class == LineClass::Blank {
            need_blank = false;
            if !last_blank {
                out.push(line);
            }
            continue;
        }

        if (need_blank || class.is_heading()) && !last_blank {
            out.push(String::new());
        }
        need_blank = class.is_heading();
        out.push(line);
    }

    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Wrapping
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a word would change the line's meaning if it started a line.
fn starts_structure(word: &str) -> bool {
    if word.starts_with(['#', '-', '*', '+', '>', '=', '|']) || word.starts_with("```") {
        return true;
    }
    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && word[digits..].starts_with('.')
}

/// Greedily wrap one line to `width` characters, keeping its indentation.
///
/// Words are never split. A word that would start a new line as structure
/// (`- x`, `# x`, `1. x`) stays on the previous line instead.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let (lead, rest) = split_indent(line);
    let lead_width = lead.chars().count();
    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in rest.split_whitespace() {
        let word_width = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_width = word_width;
        } else if lead_width + current_width + 1 + word_width <= width || starts_structure(word) {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
        } else {
            wrapped.push(format!("{}{}", lead, current));
            current = word.to_string();
            current_width = word_width;
        }
    }
    if !current.is_empty() {
        wrapped.push(format!("{}{}", lead, current));
    }
    wrapped
}

/// Wrap paragraph lines longer than `width`. Headings, list items, quotes,
/// table rows and fence content are never wrapped.
fn wrap_paragraphs(lines: Vec<String>, width: usize) -> Vec<String> {
    let classes = classify_all(&lines);
    let mut out = Vec::with_capacity(lines.len());

    for (line, class) in lines.into_iter().zip(classes) {
        let wrappable = matches!(class, LineClass::Paragraph(_))
            && !line.trim_start().starts_with('|')
            && line.chars().count() > width;
        if wrappable {
            out.extend(wrap_line(&line, width));
        } else {
            out.push(line);
        }
    }

    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
