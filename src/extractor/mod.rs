// file: src/extractor/mod.rs
// description: metadata, sentence, summary and topic extraction module exports
// reference: internal module structure

pub mod metadata;
pub mod patterns;
pub mod sentences;
pub mod summary;
pub mod topic;

pub use metadata::{MetadataExtractor, PaperMetadata, parse_metadata_response};
pub use sentences::{SentenceBuilder, locate_body, split_sentences};
pub use summary::Summarizer;
pub use topic::{TopicLabeler, normalize_label};
