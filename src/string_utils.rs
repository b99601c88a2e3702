//! UTF-8 safe string helpers
//!
//! Selections and cursor positions arrive from collaborators as byte offsets
//! that may land inside a multi-byte character (`ø`, `中`, `🎉`). Everything
//! that slices user text goes through these helpers first.

/// Largest char boundary `<= index`, clamped to the string length.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary `>= index`, clamped to the string length.
#[inline]
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Order a `(start, end)` pair and snap it outward to char boundaries.
pub fn normalize_range(s: &str, start: usize, end: usize) -> (usize, usize) {
    let (start, end) = if start > end {
        (end, start)
    } else {
        (start, end)
    };
    (floor_char_boundary(s, start), ceil_char_boundary(s, end))
}

/// First `max_chars` characters on one line: each line break becomes a
/// space and the ends are trimmed.
pub fn one_line_preview(s: &str, max_chars: usize) -> String {
    let head: String = s.chars().take(max_chars).collect();
    head.replace("\r\n", "\n")
        .replace('\n', " ")
        .trim()
        .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_and_ceil_norwegian() {
        let s = "Hei på deg"; // 'å' occupies bytes 5..7
        assert_eq!(floor_char_boundary(s, 6), 5);
        assert_eq!(ceil_char_boundary(s, 6), 7);
        assert_eq!(floor_char_boundary(s, 100), s.len());
    }

    #[test]
    fn test_floor_emoji() {
        let s = "a🎉b";
        for i in 1..5 {
            assert_eq!(floor_char_boundary(s, i), 1);
        }
        assert_eq!(ceil_char_boundary(s, 2), 5);
    }

    #[test]
    fn test_normalize_range_swaps() {
        assert_eq!(normalize_range("hello", 4, 1), (1, 4));
        assert_eq!(normalize_range("中文", 1, 4), (0, 6));
    }

    #[test]
    fn test_one_line_preview() {
        assert_eq!(one_line_preview("a\n\nb\r\nc", 100), "a  b c");
        assert_eq!(one_line_preview("\n\n# Title\nbody\n", 100), "# Title body");
        assert_eq!(one_line_preview("   \n", 100), "");
        assert_eq!(one_line_preview("abcdef", 3), "abc");
        assert_eq!(one_line_preview("ø中🎉x", 3), "ø中🎉");
    }
}
