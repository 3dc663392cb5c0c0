// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod database;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod llm;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod repository;
pub mod utils;

pub use config::{Config, DatabaseConfig, LlmConfig, PipelineConfig, PromptConfig};
pub use database::{BatchInserter, EmbeddingClient, InsertStats, LanceDbClient, SchemaManager};
pub use error::{PipelineError, Result};
pub use exporter::{ExportManifest, JsonExporter, TextExporter};
pub use extractor::{MetadataExtractor, PaperMetadata, SentenceBuilder, Summarizer, TopicLabeler};
pub use llm::{ChatClient, LanguageModel};
pub use models::{SearchResult, SentenceMetadata, SentenceRecord};
pub use parser::{MarkdownParser, ParsedMarkdown, PdfLoader, TextNormalizer};
pub use pipeline::{PipelineStats, Preprocessor, ProgressTracker};
pub use prompts::{PromptKind, PromptStore, PromptTemplate};
pub use repository::{FileClassifier, FileKind, FileScanner, ScannedFile};
pub use utils::Validator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        assert_eq!(config.database.table_name, "sentences");

        for kind in PromptKind::ALL {
            assert!(PromptTemplate::builtin(kind).verify(kind).is_ok());
        }
    }
}
