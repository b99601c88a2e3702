//! Document statistics for the status line
//!
//! Word and character counts over the raw markdown text, markers included.

// ─────────────────────────────────────────────────────────────────────────────
// DocumentStats
// ─────────────────────────────────────────────────────────────────────────────

/// Counts shown alongside the active document.
///
/// # Example
///
/// ```ignore
/// let stats = DocumentStats::from_text("Hello, World!\n\nNew paragraph.");
/// assert_eq!(stats.words, 4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Whitespace-separated words
    pub words: usize,
    /// Unicode scalar values, whitespace included
    pub characters: usize,
    /// Lines, counting an empty document as one line
    pub lines: usize,
}

impl DocumentStats {
    /// Compute all counts in one pass.
    pub fn from_text(text: &str) -> Self {
        let mut stats = Self {
            lines: 1,
            ..Self::default()
        };
        let mut in_word = false;

        for ch in text.chars() {
            stats.characters += 1;
            if ch == '\n' {
                stats.lines += 1;
            }
            if ch.is_whitespace() {
                in_word = false;
            } else if !in_word {
                in_word = true;
                stats.words += 1;
            }
        }

        stats
    }

    /// Status line text, e.g. "150 words | 892 characters".
    pub fn status_line(&self) -> String {
        format!(
            "{} word{} | {} character{}",
            self.words,
            if self.words == 1 { "" } else { "s" },
            self.characters,
            if self.characters == 1 { "" } else { "s" }
        )
    }
}

/// Number of whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of characters.
pub fn count_chars(text: &str) -> usize {
    text.chars().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_empty_text() {
        let stats = DocumentStats::from_text("");
        assert_eq!(stats.words, 0);
        assert_eq!(stats.characters, 0);
        assert_eq!(stats.lines, 1);
    }

    #[test]
    fn test_stats_simple_sentence() {
        let stats = DocumentStats::from_text("Hello, World!");
        assert_eq!(stats.words, 2);
        assert_eq!(stats.characters, 13);
    }

    #[test]
    fn test_stats_trailing_newline() {
        let stats = DocumentStats::from_text("Hello\n");
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.words, 1);
    }

    #[test]
    fn test_stats_only_whitespace() {
        let stats = DocumentStats::from_text("   \n\n   ");
        assert_eq!(stats.words, 0);
        assert_eq!(stats.characters, 8);
    }

    #[test]
    fn test_stats_unicode() {
        let stats = DocumentStats::from_text("Привет мир! 你好世界");
        assert_eq!(stats.words, 3);
        assert_eq!(stats.characters, 16);
    }

    #[test]
    fn test_counts_agree_with_struct() {
        let text = "# Heading\n\nThis is **bold**\t text.\n- Item 1";
        let stats = DocumentStats::from_text(text);
        assert_eq!(stats.words, count_words(text));
        assert_eq!(stats.characters, count_chars(text));
    }

    #[test]
    fn test_status_line_pluralization() {
        assert_eq!(
            DocumentStats::from_text("a").status_line(),
            "1 word | 1 character"
        );
        assert_eq!(
            DocumentStats::from_text("ab cd").status_line(),
            "2 words | 5 characters"
        );
    }
}
