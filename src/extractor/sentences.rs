// file: src/extractor/sentences.rs
// description: body location, sentence splitting and metadata attachment
// reference: internal text processing

use crate::extractor::metadata::PaperMetadata;
use crate::extractor::patterns::BODY_START;
use crate::models::{SentenceMetadata, SentenceRecord};

/// Slice of `text` starting at its Abstract / Introduction heading, or the
/// whole text when there is none.
pub fn locate_body(text: &str) -> &str {
    match BODY_START.find(text) {
        Some(found) => &text[found.start()..],
        None => text,
    }
}

/// Splits after `.`, `!` or `?` when whitespace follows and the next
/// sentence opens with an ASCII capital or a digit.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let end = idx + c.len_utf8();
        let mut saw_space = false;
        while let Some(&(_, next)) = chars.peek() {
            if next.is_whitespace() {
                saw_space = true;
                chars.next();
            } else {
                break;
            }
        }

        if let Some(&(next_idx, next)) = chars.peek()
            && saw_space
            && (next.is_ascii_uppercase() || next.is_ascii_digit())
        {
            push_trimmed(&mut sentences, &text[start..end]);
            start = next_idx;
        }
    }

    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

pub struct SentenceBuilder<'a> {
    metadata: &'a PaperMetadata,
    source: &'a str,
}

impl<'a> SentenceBuilder<'a> {
    pub fn new(metadata: &'a PaperMetadata, source: &'a str) -> Self {
        Self { metadata, source }
    }

    /// One record per sentence of the page body; phrase numbers restart at 1
    /// on every page.
    pub fn build_page(&self, page_text: &str, page: u32) -> Vec<SentenceRecord> {
        split_sentences(locate_body(page_text))
            .into_iter()
            .enumerate()
            .map(|(i, sentence)| {
                SentenceRecord::new(
                    sentence,
                    SentenceMetadata {
                        title: self.metadata.title.clone(),
                        authors: self.metadata.authors.clone(),
                        year: self.metadata.year.clone(),
                        citation: self.metadata.citation.clone(),
                        phrase_number: (i + 1) as u32,
                        page,
                        source: self.source.to_string(),
                    },
                )
            })
            .collect()
    }

    pub fn build_pages(&self, pages: &[String]) -> Vec<SentenceRecord> {
        pages
            .iter()
            .enumerate()
            .flat_map(|(i, text)| self.build_page(text, (i + 1) as u32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paper() -> PaperMetadata {
        PaperMetadata {
            title: "Ancient Lakes".to_string(),
            authors: vec!["Doe, J.".to_string()],
            year: "2019".to_string(),
            citation: "Doe, J. (2019). Ancient Lakes.".to_string(),
        }
    }

    #[test]
    fn test_locate_body_from_abstract() {
        let text = "Ancient Lakes\nJ. Doe\nABSTRACT We study lakes.";
        assert_eq!(locate_body(text), "ABSTRACT We study lakes.");
    }

    #[test]
    fn test_locate_body_without_heading() {
        let text = "No heading here. Just text.";
        assert_eq!(locate_body(text), text);
    }

    #[test]
    fn test_split_sentences_rules() {
        let text = "First sentence. Second one! Is it third? 4 is a number. e.g. lowercase stays.";
        assert_eq!(
            split_sentences(text),
            vec![
                "First sentence.",
                "Second one!",
                "Is it third?",
                "4 is a number. e.g. lowercase stays.",
            ]
        );
    }

    #[test]
    fn test_split_requires_whitespace() {
        assert_eq!(split_sentences("Version 1.2 Beta.Next"), vec!["Version 1.2 Beta.Next"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_split_handles_newlines_and_unicode() {
        let text = "Él llegó.\n\nNueva línea aquí. Ñandú no corta.";
        assert_eq!(
            split_sentences(text),
            vec!["Él llegó.", "Nueva línea aquí. Ñandú no corta."]
        );
    }

    #[test]
    fn test_build_pages_numbers_phrases_per_page() {
        let metadata = paper();
        let builder = SentenceBuilder::new(&metadata, "lakes.pdf");
        let pages = vec![
            "Title page\nAbstract Lakes existed. They were deep.".to_string(),
            "Results show water. More water.".to_string(),
        ];

        let records = builder.build_pages(&pages);
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].sentence, "Abstract Lakes existed.");
        assert_eq!(records[1].metadata.phrase_number, 2);
        assert_eq!(records[2].metadata.phrase_number, 1);
        assert_eq!(records[2].metadata.page, 2);
        assert_eq!(records[3].metadata.title, "Ancient Lakes");
        assert_eq!(records[3].metadata.source, "lakes.pdf");
    }
}
