// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod search_result;
pub mod sentence;

pub use search_result::SearchResult;
pub use sentence::{SentenceMetadata, SentenceRecord, vector_id};
