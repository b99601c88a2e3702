//! Inline span parsing for export backends
//!
//! Scans a single line for bold, italic, inline-code and link spans using a
//! fixed, ordered pattern set. At every step the earliest-starting match wins;
//! when two patterns start at the same index the one listed first wins, so
//! `**bold**` is never split into two italic spans.

use regex::Regex;
use std::sync::LazyLock;

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("BOLD_RE: hardcoded regex is valid"));

static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("ITALIC_RE: hardcoded regex is valid"));

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("CODE_RE: hardcoded regex is valid"));

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("LINK_RE: hardcoded regex is valid")
});

/// Pattern kinds in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanPattern {
    Bold,
    Italic,
    Code,
    Link,
}

impl SpanPattern {
    const ORDERED: [SpanPattern; 4] = [
        SpanPattern::Bold,
        SpanPattern::Italic,
        SpanPattern::Code,
        SpanPattern::Link,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            SpanPattern::Bold => &BOLD_RE,
            SpanPattern::Italic => &ITALIC_RE,
            SpanPattern::Code => &CODE_RE,
            SpanPattern::Link => &LINK_RE,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runs
// ─────────────────────────────────────────────────────────────────────────────

/// A typed piece of a line.
///
/// `text` is the visible content without markers. [`InlineRun::to_markdown`]
/// restores the exact source span, so concatenating it over all runs of a
/// line reproduces the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineRun {
    PlainText(String),
    Bold(String),
    Italic(String),
    Code(String),
    Link { text: String, target: String },
}

impl InlineRun {
    /// Visible text of the run.
    pub fn text(&self) -> &str {
        match self {
            InlineRun::PlainText(text)
            | InlineRun::Bold(text)
            | InlineRun::Italic(text)
            | InlineRun::Code(text) => text,
            InlineRun::Link { text, .. } => text,
        }
    }

    /// Source markdown for the run, markers included.
    pub fn to_markdown(&self) -> String {
        match self {
            InlineRun::PlainText(text) => text.clone(),
            InlineRun::Bold(text) => format!("**{}**", text),
            InlineRun::Italic(text) => format!("*{}*", text),
            InlineRun::Code(text) => format!("`{}`", text),
            InlineRun::Link { text, target } => format!("[{}]({})", text, target),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Split a line into typed runs.
///
/// Every iteration consumes either one matched span or the whole remainder,
/// so the loop always terminates.
pub fn parse_inline(line: &str) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    let mut remaining = line;

    while !remaining.is_empty() {
        let mut earliest: Option<(SpanPattern, regex::Captures<'_>)> = None;
        for pattern in SpanPattern::ORDERED {
            if let Some(caps) = pattern.regex().captures(remaining) {
                let start = caps.get(0).map_or(usize::MAX, |m| m.start());
                let best = earliest
                    .as_ref()
                    .and_then(|(_, c)| c.get(0))
                    .map_or(usize::MAX, |m| m.start());
                // Strict comparison keeps the earlier pattern on ties.
                if start < best {
                    earliest = Some((pattern, caps));
                }
            }
        }

        let Some((pattern, caps)) = earliest else {
            runs.push(InlineRun::PlainText(remaining.to_string()));
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };

        if whole.start() > 0 {
            runs.push(InlineRun::PlainText(remaining[..whole.start()].to_string()));
        }

        let inner = caps.get(1).map_or("", |m| m.as_str()).to_string();
        runs.push(match pattern {
            SpanPattern::Bold => InlineRun::Bold(inner),
            SpanPattern::Italic => InlineRun::Italic(inner),
            SpanPattern::Code => InlineRun::Code(inner),
            SpanPattern::Link => InlineRun::Link {
                text: inner,
                target: caps.get(2).map_or("", |m| m.as_str()).to_string(),
            },
        });

        remaining = &remaining[whole.end()..];
    }

    runs
}

/// Remove inline markers, keeping only visible text.
///
/// Used by backends that apply block styling only. Patterns are applied in
/// the same precedence order as [`parse_inline`]; link targets are dropped.
pub fn strip_inline_markers(line: &str) -> String {
    let text = BOLD_RE.replace_all(line, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = CODE_RE.replace_all(&text, "$1");
    LINK_RE.replace_all(&text, "$1").into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(runs: &[InlineRun]) -> String {
        runs.iter().map(InlineRun::to_markdown).collect()
    }

    #[test]
    fn test_bold_precedes_italic() {
        let runs = parse_inline("**a** *b*");
        assert_eq!(
            runs,
            vec![
                InlineRun::Bold("a".to_string()),
                InlineRun::PlainText(" ".to_string()),
                InlineRun::Italic("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_code_and_link() {
        let runs = parse_inline("run `cargo` or see [docs](https://x.dev)!");
        assert_eq!(
            runs,
            vec![
                InlineRun::PlainText("run ".to_string()),
                InlineRun::Code("cargo".to_string()),
                InlineRun::PlainText(" or see ".to_string()),
                InlineRun::Link {
                    text: "docs".to_string(),
                    target: "https://x.dev".to_string()
                },
                InlineRun::PlainText("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_plain_line_is_single_run() {
        assert_eq!(
            parse_inline("nothing special"),
            vec![InlineRun::PlainText("nothing special".to_string())]
        );
        assert!(parse_inline("").is_empty());
    }

    #[test]
    fn test_round_trip_reconstructs_line() {
        let lines = [
            "**a** *b*",
            "***x***",
            "unclosed **bold and *italic",
            "`a` `b` [l](u) **c**",
            "* not a list here *",
            "[broken](link",
            "emoji 🎉 **bold ø**",
        ];
        for line in lines {
            assert_eq!(reconstruct(&parse_inline(line)), line, "line: {line}");
        }
    }

    #[test]
    fn test_strip_inline_markers() {
        assert_eq!(
            strip_inline_markers("**Bold** and *it* with `code` and [link](http://a)"),
            "Bold and it with code and link"
        );
    }
}
