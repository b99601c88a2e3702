//! Line classification for the line-oriented markdown pipelines
//!
//! The export backends, the beautifier and the outline all work on raw text
//! one line at a time rather than on a parse tree. This module maps a single
//! source line to a [`LineClass`], threading a small [`FenceState`] forward so
//! that lines inside a fenced code block are never re-interpreted as
//! structure.
//!
//! # Example
//! ```ignore
//! let mut fence = FenceState::default();
//! for line in split_lines(content) {
//!     let (class, next) = classify(line, &fence);
//!     fence = next;
//! }
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Cross-line context needed for classification.
///
/// Fence detection is the only cross-line dependency, so this is all the
/// state a caller has to carry from one line to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceState {
    /// Whether a fenced code block is currently open
    pub in_fence: bool,
    /// Info string of the open fence (empty when none was given)
    pub fence_lang: String,
}

impl FenceState {
    /// State for a line inside a fence opened with `lang`.
    pub fn open(lang: impl Into<String>) -> Self {
        Self {
            in_fence: true,
            fence_lang: lang.into(),
        }
    }
}

/// Semantic tag for one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// ATX heading, level 1..=6
    Heading { level: u8, text: String },
    /// `-`, `*` or `+` list item
    BulletItem { indent: usize, text: String },
    /// `N.` list item
    OrderedItem {
        indent: usize,
        number: u64,
        text: String,
    },
    /// Bullet item carrying a `[ ]` / `[x]` checkbox
    TaskItem {
        indent: usize,
        checked: bool,
        text: String,
    },
    /// `> ` quoted line
    Blockquote(String),
    /// Opening or closing backtick fence
    FenceDelimiter { language: String, opening: bool },
    /// `---` or `***`
    HorizontalRule,
    /// Whitespace only
    Blank,
    /// Anything else outside a fence
    Paragraph(String),
    /// A line inside an open fence, kept verbatim
    Raw(String),
}

impl LineClass {
    /// Whether this line is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, LineClass::Heading { .. })
    }

    /// Whether this line is any kind of list item.
    pub fn is_list_item(&self) -> bool {
        matches!(
            self,
            LineClass::BulletItem { .. }
                | LineClass::OrderedItem { .. }
                | LineClass::TaskItem { .. }
        )
    }
}

/// The literal that opens and closes a fenced code block.
pub const FENCE_MARKER: &str = "```";

// ─────────────────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Classify one line given the fence state left by the previous line.
///
/// Returns the class and the fence state to pass to the next line. The
/// function is pure: the same `(line, fence)` always yields the same result.
pub fn classify(line: &str, fence: &FenceState) -> (LineClass, FenceState) {
    if fence.in_fence {
        if line.starts_with(FENCE_MARKER) {
            let class = LineClass::FenceDelimiter {
                language: fence.fence_lang.clone(),
                opening: false,
            };
            return (class, FenceState::default());
        }
        return (LineClass::Raw(line.to_string()), fence.clone());
    }

    if let Some(info) = line.strip_prefix(FENCE_MARKER) {
        let language = info.trim().trim_start_matches('`').to_string();
        let class = LineClass::FenceDelimiter {
            language: language.clone(),
            opening: true,
        };
        return (class, FenceState::open(language));
    }

    (classify_structure(line), FenceState::default())
}

/// Classify a line known to be outside any fence.
fn classify_structure(line: &str) -> LineClass {
    if let Some((level, text)) = parse_heading(line) {
        return LineClass::Heading {
            level,
            text: text.to_string(),
        };
    }

    if let Some(item) = parse_bullet(line) {
        return item;
    }

    if let Some(item) = parse_ordered(line) {
        return item;
    }

    if let Some(text) = line.strip_prefix("> ") {
        return LineClass::Blockquote(text.to_string());
    }

    if is_horizontal_rule(line) {
        return LineClass::HorizontalRule;
    }

    if line.trim().is_empty() {
        return LineClass::Blank;
    }

    LineClass::Paragraph(line.to_string())
}

/// Parse `#{1,6} text`. Seven or more hashes are not a heading.
pub fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    line[hashes..]
        .strip_prefix(' ')
        .map(|text| (hashes as u8, text))
}

/// Count leading indentation, a tab counting as four columns.
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Split a line into its leading whitespace and the rest.
pub fn split_indent(line: &str) -> (&str, &str) {
    let rest = line.trim_start_matches([' ', '\t']);
    (&line[..line.len() - rest.len()], rest)
}

fn parse_bullet(line: &str) -> Option<LineClass> {
    let (lead, rest) = split_indent(line);
    let mut chars = rest.chars();
    let marker = chars.next()?;
    if !matches!(marker, '-' | '*' | '+') || chars.next() != Some(' ') {
        return None;
    }
    let indent = indent_width(lead);
    let text = &rest[2..];

    if let Some((checked, task_text)) = parse_task_box(text) {
        return Some(LineClass::TaskItem {
            indent,
            checked,
            text: task_text.to_string(),
        });
    }

    Some(LineClass::BulletItem {
        indent,
        text: text.to_string(),
    })
}

/// Recognise `[ ] `, `[x] ` or `[X] ` at the start of a bullet's text.
fn parse_task_box(text: &str) -> Option<(bool, &str)> {
    let bytes = text.as_bytes();
    if bytes.len() < 4 || bytes[0] != b'[' || bytes[2] != b']' || bytes[3] != b' ' {
        return None;
    }
    match bytes[1] {
        b' ' => Some((false, &text[4..])),
        b'x' | b'X' => Some((true, &text[4..])),
        _ => None,
    }
}

fn parse_ordered(line: &str) -> Option<LineClass> {
    let (lead, rest) = split_indent(line);
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let text = rest[digits..].strip_prefix(". ")?;
    let number = rest[..digits].parse().unwrap_or(u64::MAX);
    Some(LineClass::OrderedItem {
        indent: indent_width(lead),
        number,
        text: text.to_string(),
    })
}

/// `---` or `***`, ignoring trailing whitespace.
pub fn is_horizontal_rule(line: &str) -> bool {
    matches!(line.trim_end(), "---" | "***")
}

// ─────────────────────────────────────────────────────────────────────────────
// Whole-document helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Split content into lines on `\n`, dropping a trailing `\r` from each.
///
/// A trailing newline yields a final empty line, mirroring how editors
/// count lines.
pub fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Classify every line of a document in order.
pub fn classify_document(content: &str) -> Vec<LineClass> {
    let mut fence = FenceState::default();
    split_lines(content)
        .map(|line| {
            let (class, next) = classify(line, &fence);
            fence = next;
            class
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
