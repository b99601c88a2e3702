//! Spacing cleanup for converted markdown.
//!
//! Converter output tends to carry long runs of blank lines and headings
//! glued to their neighbours. This pass normalises that without touching
//! fenced code.

use crate::markdown::classify::{classify_document, LineClass};

/// Blank-line runs longer than this collapse to [`MAX_BLANK_RUN`].
const COLLAPSE_FROM: usize = 4;
const MAX_BLANK_RUN: usize = 2;
/// Blank-line runs of at least this length before a list item collapse to one.
const LIST_COLLAPSE_FROM: usize = 3;

/// Normalise spacing of imported markdown.
///
/// - trailing whitespace is stripped from every line
/// - four or more consecutive blank lines become two
/// - three or more blank lines before a list item become one
/// - ATX headings get a blank line before and after
/// - the result ends with exactly one newline
pub fn postprocess(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.split('\n').map(|line| line.trim_end()).collect();
    let joined = lines.join("\n");
    let classes = classify_document(&joined);

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let class = &classes[i];

        if *class == LineClass::Blank {
            let run_end = (i..lines.len())
                .find(|&j| classes[j] != LineClass::Blank)
                .unwrap_or(lines.len());
            let run = run_end - i;
            let before_list = classes.get(run_end).is_some_and(LineClass::is_list_item);
            let keep = if before_list && run >= LIST_COLLAPSE_FROM {
                1
            } else if run >= COLLAPSE_FROM {
                MAX_BLANK_RUN
            } else {
                run
            };
            out.extend(std::iter::repeat("").take(keep));
            i = run_end;
            continue;
        }

        if class.is_heading() {
            if out.last().is_some_and(|prev| !prev.is_empty()) {
                out.push("");
            }
            out.push(lines[i]);
            if classes
                .get(i + 1)
                .is_some_and(|next| *next != LineClass::Blank)
            {
                out.push("");
            }
            i += 1;
            continue;
        }

        out.push(lines[i]);
        i += 1;
    }

    let body = out.join("\n");
    format!("{}\n", body.trim_matches('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_long_blank_runs() {
        assert_eq!(postprocess("a\n\n\n\n\n\nb"), "a\n\n\nb\n");
        assert_eq!(postprocess("a\n\n\n\nb"), "a\n\n\n\nb\n");
    }

    #[test]
    fn test_collapses_blank_run_before_list() {
        assert_eq!(postprocess("intro\n\n\n\n- item"), "intro\n\n- item\n");
        assert_eq!(postprocess("intro\n\n\n\n1. item"), "intro\n\n1. item\n");
        assert_eq!(postprocess("intro\n\n\n- item"), "intro\n\n\n- item\n");
    }

    #[test]
    fn test_pads_headings() {
        assert_eq!(postprocess("text\n## H\nmore"), "text\n\n## H\n\nmore\n");
        assert_eq!(postprocess("# Top\nbody"), "# Top\n\nbody\n");
    }

    #[test]
    fn test_strips_trailing_whitespace() {
        assert_eq!(postprocess("a  \nb\t\n  \nc"), "a\nb\n\nc\n");
    }

    #[test]
    fn test_single_trailing_newline() {
        assert_eq!(postprocess("a\n\n\n"), "a\n");
        assert_eq!(postprocess("a"), "a\n");
    }

    #[test]
    fn test_fenced_hash_lines_untouched() {
        let input = "```sh\n# comment\necho\n```";
        assert_eq!(postprocess(input), format!("{}\n", input));
    }

    #[test]
    fn test_idempotent() {
        let once = postprocess("# A\ntext\n\n\n\n\n- x\n## B");
        assert_eq!(postprocess(&once), once);
    }
}
