//! Markdown Formatting Operations
//!
//! Text-level editing commands behind the formatting toolbar. Every command
//! takes the full document text plus a byte-offset selection and returns the
//! rewritten text with the selection to restore.
//!
//! # Supported Formatting Commands
//! - **Inline**: Bold, Italic, Strikethrough, Inline Code
//! - **Line prefixes**: Bullet, Numbered, Task, Blockquote (toggled)
//! - **Headings**: levels 1-6, replacing any existing `#` prefix
//! - **Inserts**: Horizontal rule, Link, Image, fenced Code Block
//!
//! # Usage
//! ```ignore
//! use downedit::markdown::{apply_format, FormatCommand};
//!
//! let result = apply_format("Hello world", (0, 5), &FormatCommand::Bold);
//! assert_eq!(result.text, "**Hello** world");
//! ```

use crate::string_utils::normalize_range;

// ─────────────────────────────────────────────────────────────────────────────
// Format Command Enum
// ─────────────────────────────────────────────────────────────────────────────

/// Formatting commands that can be applied to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    /// Bold text (**text**)
    Bold,
    /// Italic text (*text*)
    Italic,
    /// Strikethrough (~~text~~)
    Strikethrough,
    /// Inline code (`code`)
    InlineCode,
    /// Heading level 1-6
    Heading(u8),
    /// `- ` line prefix
    BulletList,
    /// `1. ` line prefix
    NumberedList,
    /// `- [ ] ` line prefix
    TaskList,
    /// `> ` line prefix
    Blockquote,
    /// `---` on its own line
    HorizontalRule,
    /// `[text](url)`; empty text falls back to "link text"
    Link { text: String, url: String },
    /// `![alt](url)`; empty alt falls back to "image"
    Image { alt: String, url: String },
    /// Empty fenced block with the cursor placed inside
    CodeBlock { language: String },
}

impl FormatCommand {
    /// Human-readable command name.
    pub fn label(&self) -> String {
        match self {
            Self::Bold => "Bold".to_string(),
            Self::Italic => "Italic".to_string(),
            Self::Strikethrough => "Strikethrough".to_string(),
            Self::InlineCode => "Inline Code".to_string(),
            Self::Heading(level) => format!("Heading {}", level),
            Self::BulletList => "Bullet List".to_string(),
            Self::NumberedList => "Numbered List".to_string(),
            Self::TaskList => "Task List".to_string(),
            Self::Blockquote => "Blockquote".to_string(),
            Self::HorizontalRule => "Horizontal Rule".to_string(),
            Self::Link { .. } => "Insert Link".to_string(),
            Self::Image { .. } => "Insert Image".to_string(),
            Self::CodeBlock { .. } => "Code Block".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Format Result
// ─────────────────────────────────────────────────────────────────────────────

/// Result of applying a formatting command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    /// The new text after formatting
    pub text: String,
    /// Selection to restore, as byte offsets (equal for a bare cursor)
    pub selection: (usize, usize),
    /// Whether formatting was added (false when removed or not applied)
    pub applied: bool,
}

impl FormatResult {
    fn new(text: String, start: usize, end: usize) -> Self {
        Self {
            text,
            selection: (start, end),
            applied: true,
        }
    }

    fn cursor(text: String, at: usize) -> Self {
        Self::new(text, at, at)
    }

    fn toggled_off(mut self) -> Self {
        self.applied = false;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Apply a formatting command.
///
/// `selection` is a `(start, end)` byte range; it is ordered and snapped to
/// char boundaries before use, so any pair of offsets is accepted.
pub fn apply_format(
    text: &str,
    selection: (usize, usize),
    command: &FormatCommand,
) -> FormatResult {
    let (start, end) = normalize_range(text, selection.0, selection.1);
    match command {
        FormatCommand::Bold => wrap_selection(text, start, end, "**"),
        FormatCommand::Italic => wrap_selection(text, start, end, "*"),
        FormatCommand::Strikethrough => wrap_selection(text, start, end, "~~"),
        FormatCommand::InlineCode => wrap_selection(text, start, end, "`"),
        FormatCommand::Heading(level) => set_heading(text, start, end, *level),
        FormatCommand::BulletList => toggle_line_prefix(text, start, end, "- "),
        FormatCommand::NumberedList => toggle_line_prefix(text, start, end, "1. "),
        FormatCommand::TaskList => toggle_line_prefix(text, start, end, "- [ ] "),
        FormatCommand::Blockquote => toggle_line_prefix(text, start, end, "> "),
        FormatCommand::HorizontalRule => insert_horizontal_rule(text, start, end),
        FormatCommand::Link { text: label, url } => insert_link(text, start, end, label, url),
        FormatCommand::Image { alt, url } => insert_image(text, start, end, alt, url),
        FormatCommand::CodeBlock { language } => insert_code_block(text, start, end, language),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Wrapping
// ─────────────────────────────────────────────────────────────────────────────

/// Wrap the selection in `marker`, or unwrap it when the markers already
/// surround it. An empty selection inserts a marker pair around the cursor.
fn wrap_selection(text: &str, start: usize, end: usize, marker: &str) -> FormatResult {
    let selected = &text[start..end];
    let before = &text[..start];
    let after = &text[end..];

    if start != end && before.ends_with(marker) && after.starts_with(marker) {
        let outer_start = start - marker.len();
        let new_text = format!(
            "{}{}{}",
            &text[..outer_start],
            selected,
            &after[marker.len()..]
        );
        return FormatResult::new(new_text, outer_start, outer_start + selected.len())
            .toggled_off();
    }

    let new_text = format!("{}{}{}{}{}", before, marker, selected, marker, after);
    FormatResult::new(new_text, start + marker.len(), end + marker.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Line-Level Formatting
// ─────────────────────────────────────────────────────────────────────────────

fn line_start_of(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end_of(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map_or(text.len(), |i| pos + i)
}

/// Add `prefix` to the start of the selection's first line, or remove it
/// when the line already starts with it.
fn toggle_line_prefix(text: &str, start: usize, end: usize, prefix: &str) -> FormatResult {
    let line_start = line_start_of(text, start);

    if text[line_start..].starts_with(prefix) {
        let new_text = format!(
            "{}{}",
            &text[..line_start],
            &text[line_start + prefix.len()..]
        );
        let shift = |pos: usize| pos.saturating_sub(prefix.len()).max(line_start);
        return FormatResult::new(new_text, shift(start), shift(end)).toggled_off();
    }

    let new_text = format!("{}{}{}", &text[..line_start], prefix, &text[line_start..]);
    FormatResult::new(new_text, start + prefix.len(), end + prefix.len())
}

/// Replace the line's heading prefix (if any) with one of `level` hashes.
fn set_heading(text: &str, start: usize, end: usize, level: u8) -> FormatResult {
    let level = level.clamp(1, 6) as usize;
    let line_start = line_start_of(text, start);
    let line_end = line_end_of(text, end);
    let line = &text[line_start..line_end];

    // Existing `#{1,6}` plus any whitespace after it
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    let existing = if (1..=6).contains(&hashes) {
        hashes + line[hashes..].len() - line[hashes..].trim_start().len()
    } else {
        0
    };

    let prefix = format!("{} ", "#".repeat(level));
    let new_line = format!("{}{}", prefix, &line[existing..]);
    let new_text = format!("{}{}{}", &text[..line_start], new_line, &text[line_end..]);

    let adjust = |pos: usize| {
        (pos + prefix.len())
            .saturating_sub(existing)
            .max(line_start)
    };
    FormatResult::new(new_text, adjust(start), adjust(end))
}

// ─────────────────────────────────────────────────────────────────────────────
// Inserts
// ─────────────────────────────────────────────────────────────────────────────

/// Replace the selection with `insert` and park the cursor after it.
fn replace_selection(text: &str, start: usize, end: usize, insert: &str) -> FormatResult {
    let new_text = format!("{}{}{}", &text[..start], insert, &text[end..]);
    FormatResult::cursor(new_text, start + insert.len())
}

fn insert_horizontal_rule(text: &str, start: usize, end: usize) -> FormatResult {
    let needs_newline = start > 0 && !text[..start].ends_with('\n');
    let rule = format!("{}\n---\n\n", if needs_newline { "\n" } else { "" });
    replace_selection(text, start, end, &rule)
}

fn insert_link(text: &str, start: usize, end: usize, label: &str, url: &str) -> FormatResult {
    if url.is_empty() {
        return FormatResult::new(text.to_string(), start, end).toggled_off();
    }
    let label = if label.is_empty() { "link text" } else { label };
    let markdown = format!("[{}]({})", label, url);
    if start != end {
        let new_text = format!("{}{}{}", &text[..start], markdown, &text[end..]);
        return FormatResult::new(new_text, start, start + markdown.len());
    }
    replace_selection(text, start, end, &markdown)
}

fn insert_image(text: &str, start: usize, end: usize, alt: &str, url: &str) -> FormatResult {
    if url.is_empty() {
        return FormatResult::new(text.to_string(), start, end).toggled_off();
    }
    let alt = if alt.is_empty() { "image" } else { alt };
    replace_selection(text, start, end, &format!("![{}]({})", alt, url))
}

fn insert_code_block(text: &str, start: usize, end: usize, language: &str) -> FormatResult {
    let block = format!("\n```{}\n\n```\n", language);
    let new_text = format!("{}{}{}", &text[..start], block, &text[end..]);
    // Cursor on the empty line between the fences
    let cursor = start + 1 + 3 + language.len() + 1;
    FormatResult::cursor(new_text, cursor)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_with_selection() {
        let result = apply_format("Hello world", (0, 5), &FormatCommand::Bold);
        assert_eq!(result.text, "**Hello** world");
        assert_eq!(result.selection, (2, 7));
        assert!(result.applied);
    }

    #[test]
    fn test_bold_without_selection_inserts_pair() {
        let result = apply_format("ab", (1, 1), &FormatCommand::Bold);
        assert_eq!(result.text, "a****b");
        assert_eq!(result.selection, (3, 3));
    }

    #[test]
    fn test_bold_toggle_off() {
        let result = apply_format("**Hello** world", (2, 7), &FormatCommand::Bold);
        assert_eq!(result.text, "Hello world");
        assert_eq!(result.selection, (0, 5));
        assert!(!result.applied);
    }

    #[test]
    fn test_strikethrough_and_code() {
        let result = apply_format("gone", (0, 4), &FormatCommand::Strikethrough);
        assert_eq!(result.text, "~~gone~~");
        let result = apply_format("x = 1", (0, 5), &FormatCommand::InlineCode);
        assert_eq!(result.text, "`x = 1`");
    }

    #[test]
    fn test_bullet_toggle() {
        let on = apply_format("one\ntwo", (5, 5), &FormatCommand::BulletList);
        assert_eq!(on.text, "one\n- two");
        assert_eq!(on.selection, (7, 7));
        let off = apply_format(&on.text, on.selection, &FormatCommand::BulletList);
        assert_eq!(off.text, "one\ntwo");
        assert_eq!(off.selection, (5, 5));
        assert!(!off.applied);
    }

    #[test]
    fn test_task_and_quote_prefixes() {
        let result = apply_format("buy milk", (0, 0), &FormatCommand::TaskList);
        assert_eq!(result.text, "- [ ] buy milk");
        let result = apply_format("said", (4, 4), &FormatCommand::Blockquote);
        assert_eq!(result.text, "> said");
        let result = apply_format("first", (0, 0), &FormatCommand::NumberedList);
        assert_eq!(result.text, "1. first");
    }

    #[test]
    fn test_heading_replaces_existing_prefix() {
        let result = apply_format("## Title", (5, 5), &FormatCommand::Heading(1));
        assert_eq!(result.text, "# Title");
        assert_eq!(result.selection, (4, 4));

        let result = apply_format("intro\nTitle", (6, 6), &FormatCommand::Heading(3));
        assert_eq!(result.text, "intro\n### Title");

        let result = apply_format("x", (0, 0), &FormatCommand::Heading(9));
        assert_eq!(result.text, "###### x");
    }

    #[test]
    fn test_horizontal_rule_adds_leading_newline() {
        let result = apply_format("text", (4, 4), &FormatCommand::HorizontalRule);
        assert_eq!(result.text, "text\n\n---\n\n");
        let result = apply_format("", (0, 0), &FormatCommand::HorizontalRule);
        assert_eq!(result.text, "\n---\n\n");
    }

    #[test]
    fn test_link_and_image() {
        let cmd = FormatCommand::Link {
            text: "docs".to_string(),
            url: "https://x.dev".to_string(),
        };
        let result = apply_format("see here", (4, 8), &cmd);
        assert_eq!(result.text, "see [docs](https://x.dev)");
        assert_eq!(result.selection, (4, 25));

        let no_url = FormatCommand::Link {
            text: String::new(),
            url: String::new(),
        };
        let result = apply_format("same", (0, 0), &no_url);
        assert_eq!(result.text, "same");
        assert!(!result.applied);

        let img = FormatCommand::Image {
            alt: String::new(),
            url: "a.png".to_string(),
        };
        assert_eq!(apply_format("", (0, 0), &img).text, "![image](a.png)");
    }

    #[test]
    fn test_code_block_cursor_inside() {
        let cmd = FormatCommand::CodeBlock {
            language: "rust".to_string(),
        };
        let result = apply_format("", (0, 0), &cmd);
        assert_eq!(result.text, "\n```rust\n\n```\n");
        assert_eq!(result.selection, (9, 9));
        assert_eq!(&result.text[9..10], "\n");
    }

    #[test]
    fn test_bold_norwegian_chars() {
        let text = "Hei på deg";
        let result = apply_format(text, (4, 7), &FormatCommand::Bold);
        assert_eq!(result.text, "Hei **på** deg");
    }

    #[test]
    fn test_no_panic_on_any_byte_index() {
        let text = "Hei 中文 🎉 ø";
        let commands = [
            FormatCommand::Bold,
            FormatCommand::Heading(2),
            FormatCommand::BulletList,
            FormatCommand::HorizontalRule,
        ];
        for start in 0..=text.len() + 2 {
            for end in 0..=text.len() + 2 {
                for cmd in &commands {
                    let _ = apply_format(text, (start, end), cmd);
                }
            }
        }
    }
}
