// file: src/extractor/summary.rs
// description: passage summarization through the summary prompt
// reference: internal prompt orchestration

use crate::error::{PipelineError, Result};
use crate::extractor::patterns::ANSWER_LABEL;
use crate::llm::LanguageModel;
use crate::prompts::{PromptKind, PromptTemplate};
use std::collections::HashMap;
use tracing::debug;

pub struct Summarizer<'a, M: LanguageModel> {
    model: &'a M,
    template: PromptTemplate,
}

impl<'a, M: LanguageModel> Summarizer<'a, M> {
    pub fn new(model: &'a M, template: PromptTemplate) -> Self {
        Self { model, template }
    }

    pub fn with_builtin(model: &'a M) -> Self {
        Self::new(model, PromptTemplate::builtin(PromptKind::Summary))
    }

    pub async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(PipelineError::Validation(
                "Cannot summarize empty text".to_string(),
            ));
        }

        let mut values = HashMap::new();
        values.insert("text", text.to_string());
        let prompt = self.template.render(&values)?;

        let answer = self.model.complete(&prompt).await?;
        let summary = clean_summary(&answer);

        if summary.is_empty() {
            return Err(PipelineError::Extraction(
                "Model returned an empty summary".to_string(),
            ));
        }

        debug!("Summarized {} chars into {}", text.len(), summary.len());
        Ok(summary)
    }
}

pub(crate) fn clean_summary(answer: &str) -> String {
    let trimmed = answer.trim();
    let unlabeled = ANSWER_LABEL.replace(trimmed, "");
    strip_wrapping_quotes(unlabeled.trim()).trim().to_string()
}

pub(crate) fn strip_wrapping_quotes(text: &str) -> &str {
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”')] {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    text
}
