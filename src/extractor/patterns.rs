// file: src/extractor/patterns.rs
// description: compiled regex patterns for paper text processing
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Section headings where the body of a paper starts (English and Spanish)
    pub static ref BODY_START: Regex = Regex::new(
        r"(?i)(Abstract|Resumen|Introduction|Introducción)"
    ).expect("BODY_START regex is valid");

    // Markdown code fence wrapping a model answer
    pub static ref CODE_FENCE: Regex = Regex::new(
        r"(?s)```(?:json|JSON)?\s*(.*?)\s*```"
    ).expect("CODE_FENCE regex is valid");

    // Label prefixes models like to prepend to answers
    pub static ref ANSWER_LABEL: Regex = Regex::new(
        r"(?i)^\s*(summary|topic|label|topic label)\s*:\s*"
    ).expect("ANSWER_LABEL regex is valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_start_matches_spanish_heading() {
        let found = BODY_START.find("Título\nINTRODUCCIÓN\nTexto").unwrap();
        assert_eq!(found.as_str(), "INTRODUCCIÓN");
    }

    #[test]
    fn test_code_fence_captures_payload() {
        let caps = CODE_FENCE.captures("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(&caps[1], "{\"a\": 1}");
    }

    #[test]
    fn test_answer_label() {
        assert!(ANSWER_LABEL.is_match("Summary: text"));
        assert!(!ANSWER_LABEL.is_match("Summaries are short"));
    }
}
