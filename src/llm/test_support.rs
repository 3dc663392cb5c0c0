// file: src/llm/test_support.rs
// description: scripted language model shared by unit tests
// reference: internal test helpers

use super::LanguageModel;
use crate::error::{PipelineError, Result};
use std::sync::Mutex;

/// Replays canned answers and records the prompts it received.
pub(crate) struct StubModel {
    answers: Mutex<Vec<Result<String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub(crate) fn answering(answers: Vec<&str>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().rev().map(|a| Ok(a.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            answers: Mutex::new(vec![Err(PipelineError::Llm("offline".to_string()))]),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl LanguageModel for StubModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(PipelineError::Llm("no answer left".to_string())))
    }
}
