//! Word/character statistics and the human-readable summary.

/// Count whitespace-delimited tokens. Empty or whitespace-only text
/// yields 0.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length of the text in characters, not bytes.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Produce the human-readable summary persisted as a document's
/// `short_description`.
pub fn describe(text: &str) -> String {
    format!(
        "Document contains {} words and {} characters",
        word_count(text),
        char_count(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_splits_on_whitespace_runs() {
        assert_eq!(word_count("a b c"), 3);
        assert_eq!(word_count("  a\t\tb \n c  "), 3);
        assert_eq!(word_count("one"), 1);
    }

    #[test]
    fn test_word_count_empty_and_whitespace_only() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
    }

    #[test]
    fn test_char_count_is_characters_not_bytes() {
        assert_eq!(char_count("abc"), 3);
        // "héllo" is 6 bytes but 5 characters.
        assert_eq!(char_count("héllo"), 5);
        assert_eq!(char_count(""), 0);
    }

    #[test]
    fn test_describe_format() {
        assert_eq!(
            describe("a b c"),
            "Document contains 3 words and 5 characters"
        );
    }

    #[test]
    fn test_describe_empty() {
        assert_eq!(
            describe(""),
            "Document contains 0 words and 0 characters"
        );
    }

    #[test]
    fn test_describe_is_deterministic() {
        let text = "the quick brown fox";
        assert_eq!(describe(text), describe(text));
    }

    #[test]
    fn test_describe_whitespace_only() {
        assert_eq!(
            describe("   "),
            "Document contains 0 words and 3 characters"
        );
    }
}
