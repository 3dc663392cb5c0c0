// file: src/prompts/template.rs
// description: built-in prompt templates and placeholder rendering
// reference: named-placeholder substitution over static instruction text

use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use std::fmt;

const DOCUMENT_METADATA_TEMPLATE: &str = r#"You are an expert in parsing scientific articles.
Given the input text which contains the first page of a scientific paper, extract the following information:
1. The title of the paper.
2. The authors (in the order they appear).
3. The year of publication.
4. The citation in APA format.

The input text will be the first page of the paper, which contains the title, authors, and publication year.
The output should consist of a JSON object containing the following fields:
- Title: The full title of the paper.
- Authors: A list of the authors in the format 'Last name, First initial.' (e.g., Smith, J.)
- Year: The year of publication.
- Citation: A citation in APA format (e.g., "Smith, J., & Doe, J. (2020). Title of the paper. Journal Name, Volume(Issue), Pages.")

Return only a valid JSON object.
Input Text: {document}

Task:
Extract the title, authors, year, and generate an APA citation from the provided input text."#;

const SUMMARY_TEMPLATE: &str = r#"You are an expert scientific editor.
Summarize the following text in a single concise paragraph.

Rules:
- Start directly with the content. Do not use introductory phrases such as "This text describes", "The article discusses" or "In summary".
- Keep every key finding, method and quantity that the text states.
- Write the summary in English, even when the input text is in another language.
- Return only the summary.

Text:
{text}"#;

const TOPIC_LABEL_TEMPLATE: &str = r#"You are an expert in scientific literature.
I have a topic that contains the following documents:
{representative_documents}

The topic is described by the following keywords: {keywords}

Based on the documents and keywords above, write a short label for this topic.
The label must be at most six words long, in English, without quotes or trailing punctuation.
Return only the label."#;

/// The three prompt families the pipeline knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    DocumentMetadata,
    Summary,
    TopicLabel,
}

impl PromptKind {
    pub const ALL: [PromptKind; 3] = [
        PromptKind::DocumentMetadata,
        PromptKind::Summary,
        PromptKind::TopicLabel,
    ];

    /// Category name used in the prompt store.
    pub fn category(&self) -> &'static str {
        match self {
            PromptKind::DocumentMetadata => "document_metadata",
            PromptKind::Summary => "summary",
            PromptKind::TopicLabel => "topic_label",
        }
    }

    pub fn required_placeholders(&self) -> &'static [&'static str] {
        match self {
            PromptKind::DocumentMetadata => &["document"],
            PromptKind::Summary => &["text"],
            PromptKind::TopicLabel => &["representative_documents", "keywords"],
        }
    }

    pub fn from_category(category: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.category() == category)
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn builtin(kind: PromptKind) -> Self {
        let text = match kind {
            PromptKind::DocumentMetadata => DOCUMENT_METADATA_TEMPLATE,
            PromptKind::Summary => SUMMARY_TEMPLATE,
            PromptKind::TopicLabel => TOPIC_LABEL_TEMPLATE,
        };
        Self::new(text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names in first-occurrence order, without duplicates.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for segment in self.segments() {
            if let Segment::Placeholder(name) = segment
                && !names.iter().any(|n| n == name)
            {
                names.push(name.to_string());
            }
        }
        names
    }

    pub fn render(&self, values: &HashMap<&str, String>) -> Result<String> {
        let mut result = String::with_capacity(self.text.len());

        for segment in self.segments() {
            match segment {
                Segment::Literal(text) => result.push_str(text),
                Segment::Brace(c) => result.push(c),
                Segment::Placeholder(name) => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| PipelineError::MissingVariable(name.to_string()))?;
                    result.push_str(value);
                }
            }
        }

        Ok(result)
    }

    /// Checks that every placeholder `kind` needs is present verbatim.
    pub fn verify(&self, kind: PromptKind) -> Result<()> {
        let present = self.placeholders();
        let missing: Vec<String> = kind
            .required_placeholders()
            .iter()
            .filter(|required| !present.iter().any(|p| p == *required))
            .map(|required| required.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::MissingPlaceholders {
                kind: kind.category().to_string(),
                missing,
            })
        }
    }

    fn segments(&self) -> Vec<Segment<'_>> {
        let text = self.text.as_str();
        let bytes = text.as_bytes();
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    segments.push(Segment::Literal(&text[literal_start..i]));
                    segments.push(Segment::Brace('{'));
                    i += 2;
                    literal_start = i;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    segments.push(Segment::Literal(&text[literal_start..i]));
                    segments.push(Segment::Brace('}'));
                    i += 2;
                    literal_start = i;
                }
                b'{' => match text[i + 1..].find('}') {
                    Some(offset) if is_identifier(&text[i + 1..i + 1 + offset]) => {
                        segments.push(Segment::Literal(&text[literal_start..i]));
                        segments.push(Segment::Placeholder(&text[i + 1..i + 1 + offset]));
                        i += offset + 2;
                        literal_start = i;
                    }
                    _ => i += 1,
                },
                _ => i += 1,
            }
        }

        segments.push(Segment::Literal(&text[literal_start..]));
        segments
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Brace(char),
    Placeholder(&'a str),
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_templates_carry_required_placeholders() {
        for kind in PromptKind::ALL {
            let template = PromptTemplate::builtin(kind);
            assert!(template.verify(kind).is_ok(), "{} failed verification", kind);
        }

        assert!(PromptTemplate::builtin(PromptKind::DocumentMetadata)
            .text()
            .contains("{document}"));
        assert!(PromptTemplate::builtin(PromptKind::Summary)
            .text()
            .contains("{text}"));
        let topic = PromptTemplate::builtin(PromptKind::TopicLabel);
        assert!(topic.text().contains("{representative_documents}"));
        assert!(topic.text().contains("{keywords}"));
    }

    #[test]
    fn test_placeholders_deduplicated_in_order() {
        let template = PromptTemplate::new("{b} then {a} then {b}");
        assert_eq!(template.placeholders(), vec!["b", "a"]);
    }

    #[test]
    fn test_render_substitutes_values() {
        let template = PromptTemplate::new("Topic: {keywords}\nDocs: {representative_documents}");
        let mut values = HashMap::new();
        values.insert("keywords", "mars, shoreline".to_string());
        values.insert("representative_documents", "doc one".to_string());

        let rendered = template.render(&values).unwrap();
        assert_eq!(rendered, "Topic: mars, shoreline\nDocs: doc one");
    }

    #[test]
    fn test_render_does_not_expand_inserted_values() {
        let template = PromptTemplate::new("Input: {document}");
        let mut values = HashMap::new();
        values.insert("document", "contains {text} literally".to_string());

        let rendered = template.render(&values).unwrap();
        assert_eq!(rendered, "Input: contains {text} literally");
    }

    #[test]
    fn test_render_missing_variable() {
        let template = PromptTemplate::new("Summarize {text}");
        let err = template.render(&HashMap::new()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingVariable(name) if name == "text"));
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let template = PromptTemplate::new(r#"Return {{"Title": ...}} for {document}"#);
        assert_eq!(template.placeholders(), vec!["document"]);

        let mut values = HashMap::new();
        values.insert("document", "page".to_string());
        assert_eq!(
            template.render(&values).unwrap(),
            r#"Return {"Title": ...} for page"#
        );
    }

    #[test]
    fn test_verify_reports_missing() {
        let template = PromptTemplate::new("Label these: {keywords}");
        match template.verify(PromptKind::TopicLabel) {
            Err(PipelineError::MissingPlaceholders { kind, missing }) => {
                assert_eq!(kind, "topic_label");
                assert_eq!(missing, vec!["representative_documents"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_kind_from_category() {
        assert_eq!(
            PromptKind::from_category("summary"),
            Some(PromptKind::Summary)
        );
        assert_eq!(PromptKind::from_category("unknown"), None);
    }
}
