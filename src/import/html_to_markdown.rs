//! HTML → Markdown
//!
//! Runs htmd with a fixed rule set: ATX headings, `-` bullets, fenced code
//! blocks, `*` / `**` emphasis and inline links. Custom element handlers add
//! three rules on top:
//!
//! - tables become pipe tables with a `---` separator after the first row,
//!   whether or not that row used header cells
//! - `del`, `s` and `strike` are wrapped in `~~`
//! - a list item holding a checkbox becomes `- [x] ` / `- [ ] `
//!
//! A short line pass afterwards evens out list marker spacing.

use crate::error::{Error, Result};
use htmd::options::{BulletListMarker, CodeBlockStyle, HeadingStyle, Options};
use htmd::{Element, HtmlToMarkdown};
use regex::Regex;
use std::sync::LazyLock;

static EXCESS_NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("EXCESS_NEWLINES_RE: hardcoded regex is valid"));

/// List marker with its following spaces, plus a task box if one follows.
static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*(?:[-*+]|\d+\.))[ \t]+(?:(\[[ xX]\])(?:[ \t]+|$))?")
        .expect("LIST_MARKER_RE: hardcoded regex is valid")
});

/// Separators the cell and row handlers leave for the table handler.
const CELL_END: char = '\u{1f}';
const ROW_START: char = '\u{1e}';

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

fn has_attr(element: &Element, name: &str) -> bool {
    element.attrs.iter().any(|a| &*a.name.local == name)
}

fn attr_value(element: &Element, name: &str) -> Option<String> {
    element
        .attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| a.value.to_string())
}

/// Wrap inline content in `marker`, keeping surrounding whitespace outside.
fn wrap_inline(content: &str, marker: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Some(content.to_string());
    }
    let lead = if content.starts_with(char::is_whitespace) {
        " "
    } else {
        ""
    };
    let tail = if content.ends_with(char::is_whitespace) {
        " "
    } else {
        ""
    };
    Some(format!("{}{}{}{}{}", lead, marker, trimmed, marker, tail))
}

fn checkbox(element: Element) -> Option<String> {
    let is_checkbox =
        attr_value(&element, "type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox"));
    if !is_checkbox {
        return Some(String::new());
    }
    if has_attr(&element, "checked") {
        Some("[x] ".to_string())
    } else {
        Some("[ ] ".to_string())
    }
}

fn table_cell(element: Element) -> Option<String> {
    let text = element
        .content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    Some(format!("{}{}", text.replace('|', "\\|"), CELL_END))
}

fn table_row(element: Element) -> Option<String> {
    Some(format!("{}{}", ROW_START, element.content))
}

/// Rows come in as `ROW_START cell CELL_END cell CELL_END ...`; anything
/// between rows is whitespace from the source.
fn table(element: Element) -> Option<String> {
    let rows: Vec<Vec<&str>> = element
        .content
        .split(ROW_START)
        .skip(1)
        .map(|row| {
            let mut cells: Vec<&str> = row.split(CELL_END).map(str::trim).collect();
            cells.pop();
            cells
        })
        .filter(|cells| !cells.is_empty())
        .collect();
    let Some(first) = rows.first() else {
        return Some(String::new());
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, cells) in rows.iter().enumerate() {
        lines.push(format!("| {} |", cells.join(" | ")));
        if i == 0 {
            lines.push(format!("|{}", " --- |".repeat(first.len())));
        }
    }
    Some(format!("\n\n{}\n\n", lines.join("\n")))
}

fn create_converter() -> HtmlToMarkdown {
    let options = Options {
        heading_style: HeadingStyle::Atx,
        bullet_list_marker: BulletListMarker::Dash,
        code_block_style: CodeBlockStyle::Fenced,
        ..Default::default()
    };

    HtmlToMarkdown::builder()
        .options(options)
        .skip_tags(vec!["head", "script", "style"])
        .add_handler(vec!["strong", "b"], |element: Element| {
            wrap_inline(element.content, "**")
        })
        .add_handler(vec!["em", "i"], |element: Element| {
            wrap_inline(element.content, "*")
        })
        .add_handler(vec!["del", "s", "strike"], |element: Element| {
            wrap_inline(element.content, "~~")
        })
        .add_handler(vec!["input"], checkbox)
        .add_handler(vec!["td", "th"], table_cell)
        .add_handler(vec!["tr"], table_row)
        .add_handler(vec!["table"], table)
        .build()
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalisation
// ─────────────────────────────────────────────────────────────────────────────

/// One space after every list marker and task box, outside fenced code.
fn tidy_list_markers(markdown: &str) -> String {
    let mut in_fence = false;
    markdown
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                return line.to_string();
            }
            if in_fence {
                return line.to_string();
            }
            LIST_MARKER_RE
                .replace(line, |caps: &regex::Captures| match caps.get(2) {
                    Some(task) => format!("{} {} ", &caps[1], task.as_str()),
                    None => format!("{} ", &caps[1]),
                })
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

/// Convert an HTML document or fragment to markdown.
///
/// The result still needs the post-processor for final spacing.
pub fn html_to_markdown(html: &str) -> Result<String> {
    let markdown = create_converter()
        .convert(html)
        .map_err(|e| Error::import(format!("HTML conversion failed: {}", e)))?;
    let tidied = tidy_list_markers(&markdown);
    Ok(EXCESS_NEWLINES_RE
        .replace_all(tidied.trim(), "\n\n")
        .into_owned())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(html: &str) -> String {
        html_to_markdown(html).unwrap()
    }

    #[test]
    fn test_headings_are_atx() {
        let md = convert("<h1>Title</h1><h3>Sub section</h3>");
        assert!(md.starts_with("# Title\n"));
        assert!(md.lines().any(|l| l == "### Sub section"));
        assert!(!md.contains("==="));
    }

    #[test]
    fn test_emphasis_delimiters() {
        let md = convert("<p><strong>bold</strong> and <em>it</em> and <b>spaced </b>x</p>");
        assert!(md.contains("**bold** and *it*"));
        assert!(md.contains("**spaced**"));
        assert!(!md.contains('_'));
    }

    #[test]
    fn test_strikethrough_rule() {
        let md = convert("<p><del>a</del> <s>b</s> <strike>c</strike></p>");
        assert_eq!(md, "~~a~~ ~~b~~ ~~c~~");
    }

    #[test]
    fn test_inline_link_and_image() {
        let md = convert(r#"<p><a href="https://x.io">site</a> <img src="a.png" alt="pic"></p>"#);
        assert!(md.contains("[site](https://x.io)"));
        assert!(md.contains("![pic](a.png)"));
    }

    #[test]
    fn test_bullets_use_dash() {
        let md = convert("<ul><li>a</li><li>b</li></ul>");
        assert_eq!(md, "- a\n- b");
    }

    #[test]
    fn test_task_list_items() {
        let html = r#"<ul><li><input type="checkbox" checked>done</li><li><input type="checkbox"> todo</li></ul>"#;
        assert_eq!(convert(html), "- [x] done\n- [ ] todo");
    }

    #[test]
    fn test_table_separator_after_first_row() {
        let html = "<table><tr><td>A</td><td>B</td></tr><tr><td>1</td><td>x|y</td></tr></table>";
        assert_eq!(convert(html), "| A | B |\n| --- | --- |\n| 1 | x\\|y |");
    }

    #[test]
    fn test_table_with_sections_and_whitespace() {
        let html = "<table>\n<thead><tr><th> Name </th><th>Qty</th></tr></thead>\n<tbody>\n<tr><td>apple</td><td>3</td></tr>\n</tbody></table>";
        assert_eq!(
            convert(html),
            "| Name | Qty |\n| --- | --- |\n| apple | 3 |"
        );
    }

    #[test]
    fn test_fenced_code_block() {
        let html = "<pre><code class=\"language-rust\">fn main() {\n    run();\n}\n</code></pre>";
        let md = convert(html);
        assert!(md.starts_with("```"));
        assert!(md.contains("fn main() {\n    run();\n}"));
        assert!(md.ends_with("```"));
    }

    #[test]
    fn test_inline_code_and_blockquote() {
        let md = convert("<blockquote><p>use <code>x</code></p></blockquote>");
        assert_eq!(md, "> use `x`");
    }

    #[test]
    fn test_script_and_head_dropped() {
        let html = "<html><head><title>t</title><style>p{}</style></head><body><p>hi</p><script>x()</script></body></html>";
        assert_eq!(convert(html), "hi");
    }

    #[test]
    fn test_tidy_list_markers_outside_fences() {
        let md = "-   a\n1.  b\n- [x]   c\n- [x](link)\n```\n-   kept\n```";
        assert_eq!(
            tidy_list_markers(md),
            "- a\n1. b\n- [x] c\n- [x](link)\n```\n-   kept\n```"
        );
    }
}
