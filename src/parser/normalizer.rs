// file: src/parser/normalizer.rs
// description: whitespace and hyphenation cleanup for extracted page text
// reference: PDF text extraction artifacts

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HYPHEN_BREAK: Regex =
        Regex::new(r"(\p{L})-\s*\n\s*(\p{Ll})").expect("HYPHEN_BREAK regex is valid");
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("WHITESPACE_RUN regex is valid");
}

pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, content: &str) -> String {
        let normalized = self.join_hyphenated_words(content);
        let normalized = self.strip_control_chars(&normalized);
        self.collapse_whitespace(&normalized)
    }

    fn join_hyphenated_words(&self, content: &str) -> String {
        HYPHEN_BREAK.replace_all(content, "$1$2").into_owned()
    }

    fn strip_control_chars(&self, content: &str) -> String {
        content
            .chars()
            .filter(|c| !c.is_control() || c.is_whitespace())
            .collect()
    }

    fn collapse_whitespace(&self, content: &str) -> String {
        WHITESPACE_RUN.replace_all(content, " ").trim().to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphenated_line_breaks_are_joined() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("the shore-\nline was visible"),
            "the shoreline was visible"
        );
        assert_eq!(normalizer.normalize("Mars-\nExpress"), "Mars- Express");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("  Line 1\n\n\nLine\t2  "),
            "Line 1 Line 2"
        );
    }

    #[test]
    fn test_control_characters_removed() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("a\u{7}b\u{0}c"), "abc");
    }
}
