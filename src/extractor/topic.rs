// file: src/extractor/topic.rs
// description: topic cluster labeling through the topic_label prompt
// reference: internal prompt orchestration

use crate::error::{PipelineError, Result};
use crate::extractor::patterns::ANSWER_LABEL;
use crate::extractor::summary::strip_wrapping_quotes;
use crate::llm::LanguageModel;
use crate::prompts::{PromptKind, PromptTemplate};
use std::collections::HashMap;
use tracing::debug;

pub const MAX_LABEL_WORDS: usize = 6;

pub struct TopicLabeler<'a, M: LanguageModel> {
    model: &'a M,
    template: PromptTemplate,
}

impl<'a, M: LanguageModel> TopicLabeler<'a, M> {
    pub fn new(model: &'a M, template: PromptTemplate) -> Self {
        Self { model, template }
    }

    pub fn with_builtin(model: &'a M) -> Self {
        Self::new(model, PromptTemplate::builtin(PromptKind::TopicLabel))
    }

    pub async fn label(&self, documents: &[String], keywords: &[String]) -> Result<String> {
        if documents.is_empty() && keywords.is_empty() {
            return Err(PipelineError::Validation(
                "A topic needs representative documents or keywords".to_string(),
            ));
        }

        let mut values = HashMap::new();
        values.insert("representative_documents", documents.join("\n"));
        values.insert("keywords", keywords.join(", "));
        let prompt = self.template.render(&values)?;

        let answer = self.model.complete(&prompt).await?;
        let label = normalize_label(&answer);

        if label.is_empty() {
            return Err(PipelineError::Extraction(
                "Model returned an empty topic label".to_string(),
            ));
        }

        debug!("Labeled topic ({} documents): {}", documents.len(), label);
        Ok(label)
    }
}

/// First non-empty line, unlabeled and unquoted, capped at six words.
pub fn normalize_label(answer: &str) -> String {
    let line = answer
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    let unlabeled = ANSWER_LABEL.replace(line, "");
    let unquoted = strip_wrapping_quotes(unlabeled.trim().trim_end_matches(LABEL_PUNCTUATION));

    unquoted
        .split_whitespace()
        .take(MAX_LABEL_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(LABEL_PUNCTUATION)
        .to_string()
}

const LABEL_PUNCTUATION: [char; 6] = ['.', '!', '?', ',', ';', ':'];
