// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("PDF loading error in {file}: {message}")]
    PdfLoad { file: String, message: String },

    #[error("Markdown parsing error in {file}: {message}")]
    MarkdownParse { file: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Prompt template is missing a value for {{{0}}}")]
    MissingVariable(String),

    #[error("Prompt template for '{kind}' is missing placeholders: {missing:?}")]
    MissingPlaceholders { kind: String, missing: Vec<String> },

    #[error("No prompt found at index {index} in category '{category}'")]
    PromptNotFound { category: String, index: usize },

    #[error("Prompt store error: {0}")]
    PromptStore(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}
