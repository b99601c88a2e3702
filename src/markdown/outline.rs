//! Heading outline
//!
//! Lists the ATX headings of a document for navigation. Built on the line
//! classifier, so headings inside fences are skipped and Setext headings are
//! not recognized (run the beautifier first to convert them).
//!
//! Anchors follow the same slug rule the HTML renderer uses for heading ids,
//! so an outline entry links straight into an exported HTML document.

use crate::markdown::classify::{classify, split_lines, FenceState, LineClass};
use crate::markdown::inline::strip_inline_markers;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// One heading of the document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineHeading {
    /// Heading level (1-6)
    pub level: u8,
    /// Heading text with inline markers removed
    pub text: String,
    /// Anchor id, unique within the document
    pub anchor: String,
    /// 0-indexed source line
    pub line: usize,
}

static REJECTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{M}\p{N}\p{Pc} \-]").expect("REJECTED_RE: hardcoded regex is valid")
});

/// Base slug for a heading: lowercase, punctuation removed, spaces to `-`.
pub fn heading_anchor(text: &str) -> String {
    REJECTED_RE
        .replace_all(&text.to_lowercase(), "")
        .replace(' ', "-")
}

/// Extract the outline in document order.
///
/// Repeated slugs get `-1`, `-2`, ... suffixes in order of appearance.
pub fn extract_outline(content: &str) -> Vec<OutlineHeading> {
    let mut fence = FenceState::default();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut outline = Vec::new();

    for (index, line) in split_lines(content).enumerate() {
        let (class, next) = classify(line, &fence);
        fence = next;

        let LineClass::Heading { level, text } = class else {
            continue;
        };
        let text = strip_inline_markers(text.trim());
        let base = heading_anchor(&text);
        let anchor = match seen.get_mut(&base) {
            Some(count) => {
                *count += 1;
                format!("{}-{}", base, count)
            }
            None => {
                seen.insert(base.clone(), 0);
                base
            }
        };

        outline.push(OutlineHeading {
            level,
            text,
            anchor,
            line: index,
        });
    }

    outline
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parser::{render_to_html, MarkdownOptions};

    #[test]
    fn test_extract_outline_skips_fences() {
        let outline = extract_outline("# Top\n\ntext\n\n## Sub `code`\n\n```\n# not\n```\n");
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].level, 1);
        assert_eq!(outline[0].text, "Top");
        assert_eq!(outline[0].line, 0);
        assert_eq!(outline[1].text, "Sub code");
        assert_eq!(outline[1].anchor, "sub-code");
        assert_eq!(outline[1].line, 4);
    }

    #[test]
    fn test_heading_anchor() {
        assert_eq!(heading_anchor("Hello, World!"), "hello-world");
        assert_eq!(heading_anchor("snake_case ok"), "snake_case-ok");
        assert_eq!(heading_anchor("Årets tall"), "årets-tall");
    }

    #[test]
    fn test_duplicate_anchors_are_suffixed() {
        let outline = extract_outline("# Notes\n## Notes\n### Notes");
        let anchors: Vec<&str> = outline.iter().map(|h| h.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["notes", "notes-1", "notes-2"]);
    }

    #[test]
    fn test_anchor_matches_rendered_id() {
        let md = "# Getting Started, Quickly\n";
        let html = render_to_html(md, &MarkdownOptions::default());
        let outline = extract_outline(md);
        assert!(html.contains(&format!("id=\"{}\"", outline[0].anchor)));
    }
}
