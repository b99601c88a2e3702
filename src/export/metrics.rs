//! Text measurement for the PDF backend
//!
//! Advance widths of the standard Helvetica faces (units per 1000 em) for
//! printable ASCII, so paragraphs can be wrapped before they are placed on the
//! page. Characters outside the table are measured as a digit.

/// Millimetres per typographic point.
pub const MM_PER_PT: f32 = 0.352_778;

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn char_width(ch: char, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    match ch as u32 {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in millimetres.
pub fn text_width_mm(text: &str, size_pt: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, bold))).sum();
    units as f32 / 1000.0 * size_pt * MM_PER_PT
}

/// Break `text` into lines no wider than `max_width_mm`.
///
/// Breaks at spaces; a single word wider than the limit is split between
/// characters. Always returns at least one line.
pub fn wrap_to_width(text: &str, size_pt: f32, bold: bool, max_width_mm: f32) -> Vec<String> {
    let fits = |s: &str| text_width_mm(s, size_pt, bold) <= max_width_mm;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if fits(word) {
            current = word.to_string();
            continue;
        }
        for ch in word.chars() {
            current.push(ch);
            if !fits(&current) && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_scales_with_size() {
        let small = text_width_mm("Hello", 10.0, false);
        let large = text_width_mm("Hello", 20.0, false);
        assert!((large - 2.0 * small).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider() {
        assert!(text_width_mm("bold text", 11.0, true) > text_width_mm("bold text", 11.0, false));
    }

    #[test]
    fn test_known_width() {
        // "0" is 556 units: 0.556 * 10pt * 0.352778 mm/pt
        let w = text_width_mm("0", 10.0, false);
        assert!((w - 1.9614).abs() < 1e-3);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(5);
        let lines = wrap_to_width(&text, 11.0, false, 50.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 11.0, false) <= 50.0);
        }
        assert_eq!(lines.join(" "), text.trim_end());
    }

    #[test]
    fn test_wrap_splits_long_word() {
        let word = "x".repeat(200);
        let lines = wrap_to_width(&word, 11.0, false, 20.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_empty_yields_one_line() {
        assert_eq!(wrap_to_width("", 11.0, false, 50.0), vec![String::new()]);
    }
}
