// file: src/extractor/metadata.rs
// description: bibliographic metadata extraction through the document_metadata prompt
// reference: https://docs.rs/serde_json

use crate::error::{PipelineError, Result};
use crate::extractor::patterns::CODE_FENCE;
use crate::llm::LanguageModel;
use crate::prompts::{PromptKind, PromptTemplate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub title: String,
    pub authors: Vec<String>,
    pub year: String,
    pub citation: String,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(rename = "Title", alias = "title")]
    title: Option<String>,
    #[serde(rename = "Authors", alias = "authors", default)]
    authors: Value,
    #[serde(rename = "Year", alias = "year", default)]
    year: Value,
    #[serde(rename = "Citation", alias = "citation")]
    citation: Option<String>,
}

/// Parses a model answer into [`PaperMetadata`], tolerating code fences and
/// prose around the JSON object.
pub fn parse_metadata_response(text: &str) -> Result<PaperMetadata> {
    let payload = match CODE_FENCE.captures(text) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(text),
        None => text,
    };

    let start = payload.find('{');
    let end = payload.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &payload[start..=end],
        _ => {
            return Err(PipelineError::Extraction(
                "Model answer contains no JSON object".to_string(),
            ));
        }
    };

    let raw: RawMetadata = serde_json::from_str(json)
        .map_err(|e| PipelineError::Extraction(format!("Invalid metadata JSON: {}", e)))?;

    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| PipelineError::Extraction("Metadata has no Title".to_string()))?;

    Ok(PaperMetadata {
        title,
        authors: authors_from(&raw.authors),
        year: year_from(&raw.year),
        citation: raw.citation.unwrap_or_default().trim().to_string(),
    })
}

fn authors_from(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(';')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn year_from(value: &Value) -> String {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(year), _) => year.to_string(),
            (None, Some(year)) if year.fract() == 0.0 => format!("{}", year as i64),
            _ => n.to_string(),
        },
        Value::String(s) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// First `max_chars` characters, cut on a char boundary.
pub fn leading_window(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct MetadataExtractor<'a, M: LanguageModel> {
    model: &'a M,
    template: PromptTemplate,
    window_chars: usize,
}

impl<'a, M: LanguageModel> MetadataExtractor<'a, M> {
    pub fn new(model: &'a M, template: PromptTemplate, window_chars: usize) -> Self {
        Self {
            model,
            template,
            window_chars,
        }
    }

    pub fn with_builtin(model: &'a M) -> Self {
        Self::new(model, PromptTemplate::builtin(PromptKind::DocumentMetadata), 1000)
    }

    pub async fn extract(&self, source: &str, first_page: &str) -> Result<PaperMetadata> {
        let mut values = HashMap::new();
        values.insert(
            "document",
            leading_window(first_page, self.window_chars).to_string(),
        );
        let prompt = self.template.render(&values)?;

        let answer = self.model.complete(&prompt).await.map_err(|e| {
            PipelineError::Extraction(format!(
                "Error while parsing the paper author information for {}: {}",
                source, e
            ))
        })?;

        let metadata = parse_metadata_response(&answer).map_err(|e| {
            PipelineError::Extraction(format!(
                "Error while parsing the paper author information for {}: {}",
                source, e
            ))
        })?;

        debug!("Extracted metadata for {}: {}", source, metadata.title);
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_support::StubModel;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_json() {
        let answer = r#"{"Title": "Evidence of shorelines on Mars", "Authors": ["Smith, J.", "Doe, J."], "Year": 2020, "Citation": "Smith, J., & Doe, J. (2020). Evidence of shorelines on Mars. Icarus, 1(2), 3-4."}"#;
        let metadata = parse_metadata_response(answer).unwrap();

        assert_eq!(metadata.title, "Evidence of shorelines on Mars");
        assert_eq!(metadata.authors, vec!["Smith, J.", "Doe, J."]);
        assert_eq!(metadata.year, "2020");
        assert!(metadata.citation.starts_with("Smith, J., & Doe, J. (2020)"));
    }

    #[test]
    fn test_parse_fenced_json_with_lowercase_keys() {
        let answer = "Here is the result:\n```json\n{\"title\": \"Lakes\", \"authors\": \"Roe, A.; Poe, B.\", \"year\": \"2018\", \"citation\": \"Roe (2018)\"}\n```";
        let metadata = parse_metadata_response(answer).unwrap();

        assert_eq!(metadata.title, "Lakes");
        assert_eq!(metadata.authors, vec!["Roe, A.", "Poe, B."]);
        assert_eq!(metadata.year, "2018");
    }

    #[test]
    fn test_parse_rejects_missing_title_or_json() {
        assert!(parse_metadata_response(r#"{"Authors": []}"#).is_err());
        assert!(parse_metadata_response("I could not find any metadata").is_err());
    }

    #[test]
    fn test_parse_float_year_as_whole_number() {
        let answer = r#"{"Title": "Dunes", "Authors": [], "Year": 2019.0, "Citation": "C"}"#;
        assert_eq!(parse_metadata_response(answer).unwrap().year, "2019");

        let answer = r#"{"Title": "Dunes", "Authors": [], "Year": 2019.5, "Citation": "C"}"#;
        assert_eq!(parse_metadata_response(answer).unwrap().year, "2019.5");
    }

    #[test]
    fn test_leading_window_respects_char_boundaries() {
        assert_eq!(leading_window("Introducción", 11), "Introducció");
        assert_eq!(leading_window("short", 1000), "short");
    }

    #[tokio::test]
    async fn test_extract_sends_truncated_first_page() {
        let model = StubModel::answering(vec![r#"{"Title": "T", "Authors": [], "Year": 2001, "Citation": "C"}"#]);
        let extractor =
            MetadataExtractor::new(&model, PromptTemplate::new("Input Text: {document}"), 5);

        let metadata = extractor.extract("paper.pdf", "ABCDEFGHIJ").await.unwrap();
        assert_eq!(metadata.title, "T");
        assert_eq!(metadata.year, "2001");

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts[0], "Input Text: ABCDE");
    }

    #[tokio::test]
    async fn test_extract_wraps_model_failure() {
        let model = StubModel::failing();
        let extractor = MetadataExtractor::with_builtin(&model);

        let err = extractor.extract("paper.pdf", "page").await.unwrap_err();
        assert!(err.to_string().contains("paper.pdf"));
    }
}
