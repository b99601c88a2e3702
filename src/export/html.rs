//! HTML Export Generation
//!
//! This module generates complete HTML documents from markdown content, with
//! inlined CSS for standalone viewing. Structure comes entirely from the full
//! markdown renderer; nothing here looks at individual lines.

use crate::export::options::{HtmlOptions, HtmlStyle};
use crate::markdown::{render_to_html, MarkdownOptions};
use log::info;

// ─────────────────────────────────────────────────────────────────────────────
// HTML Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Generate a complete HTML document from markdown content.
///
/// # Arguments
///
/// * `markdown` - The markdown source text
/// * `title` - Document title, usually the file name
/// * `options` - Dark mode and style variant
///
/// # Returns
///
/// A complete HTML document as a string.
pub fn render_html(markdown: &str, title: &str, options: &HtmlOptions) -> String {
    let body = render_to_html(markdown, &MarkdownOptions::default());

    let mut css = String::from(LIGHT_VARS);
    if options.include_dark_mode {
        css.push_str(DARK_VARS);
    }
    css.push_str(LAYOUT_CSS);
    if options.style == HtmlStyle::Full {
        css.push_str(TYPOGRAPHY_CSS);
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="Downedit">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <article class="markdown-body">
{body}
    </article>
</body>
</html>
"#,
        title = html_escape(title),
        css = css,
        body = body,
    );

    info!("Exported HTML ({} bytes)", html.len());
    html
}

// ─────────────────────────────────────────────────────────────────────────────
// CSS
// ─────────────────────────────────────────────────────────────────────────────

const LIGHT_VARS: &str = r#"
:root {
    --bg-primary: #ffffff;
    --text-primary: #1a1a1a;
    --text-secondary: #666666;
    --accent: #0066cc;
    --border: #e0e0e0;
    --code-bg: #f6f8fa;
}
"#;

const DARK_VARS: &str = r#"
@media (prefers-color-scheme: dark) {
    :root {
        --bg-primary: #1e1e1e;
        --text-primary: #e0e0e0;
        --text-secondary: #a0a0a0;
        --accent: #4da6ff;
        --border: #404040;
        --code-bg: #2d2d2d;
    }
}
"#;

/// Page layout and colours; always included.
const LAYOUT_CSS: &str = r#"
*, *::before, *::after {
    box-sizing: border-box;
}

body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif;
    font-size: 16px;
    line-height: 1.6;
    color: var(--text-primary);
    background: var(--bg-primary);
}

.markdown-body {
    max-width: 800px;
    margin: 0 auto;
    padding: 40px 20px;
}

.markdown-body a {
    color: var(--accent);
}
"#;

/// Element typography for the full style.
const TYPOGRAPHY_CSS: &str = r#"
.markdown-body h1,
.markdown-body h2,
.markdown-body h3,
.markdown-body h4,
.markdown-body h5,
.markdown-body h6 {
    margin-top: 24px;
    margin-bottom: 16px;
    font-weight: 600;
    line-height: 1.25;
}

.markdown-body h1 { font-size: 2em; border-bottom: 1px solid var(--border); padding-bottom: 0.3em; }
.markdown-body h2 { font-size: 1.5em; border-bottom: 1px solid var(--border); padding-bottom: 0.3em; }
.markdown-body h3 { font-size: 1.25em; }
.markdown-body h4 { font-size: 1em; }

.markdown-body p {
    margin-top: 0;
    margin-bottom: 16px;
}

.markdown-body a { text-decoration: none; }
.markdown-body a:hover { text-decoration: underline; }
.markdown-body a.anchor { display: none; }

.markdown-body ul,
.markdown-body ol {
    margin-top: 0;
    margin-bottom: 16px;
    padding-left: 2em;
}

.markdown-body li { margin-bottom: 4px; }

.markdown-body li:has(> input[type="checkbox"]) {
    list-style-type: none;
}

.markdown-body blockquote {
    margin: 0 0 16px 0;
    padding: 0 1em;
    border-left: 4px solid var(--border);
    color: var(--text-secondary);
}

.markdown-body code {
    font-family: 'Cascadia Code', 'JetBrains Mono', Consolas, monospace;
    font-size: 0.9em;
    padding: 0.2em 0.4em;
    background: var(--code-bg);
    border-radius: 4px;
}

.markdown-body pre {
    margin-top: 0;
    margin-bottom: 16px;
    padding: 16px;
    overflow-x: auto;
    background: var(--code-bg);
    border-radius: 6px;
    line-height: 1.45;
}

.markdown-body pre code {
    padding: 0;
    background: transparent;
}

.markdown-body table {
    width: 100%;
    margin-bottom: 16px;
    border-collapse: collapse;
}

.markdown-body th,
.markdown-body td {
    padding: 8px 12px;
    border: 1px solid var(--border);
    text-align: left;
}

.markdown-body th {
    background: var(--code-bg);
    font-weight: 600;
}

.markdown-body hr {
    height: 1px;
    margin: 24px 0;
    border: none;
    background: var(--border);
}

.markdown-body img {
    max-width: 100%;
    height: auto;
}
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Utility Functions
// ─────────────────────────────────────────────────────────────────────────────

/// HTML-escape a string.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
