// file: src/models/sentence.rs
// description: sentence records with bibliographic metadata and stable vector ids
// reference: internal data structures

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceMetadata {
    pub title: String,
    pub authors: Vec<String>,
    pub year: String,
    #[serde(rename = "citation_format_x")]
    pub citation: String,
    pub phrase_number: u32,
    pub page: u32,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub sentence: String,
    pub metadata: SentenceMetadata,
}

impl SentenceRecord {
    pub fn new(sentence: impl Into<String>, metadata: SentenceMetadata) -> Self {
        Self {
            sentence: sentence.into(),
            metadata,
        }
    }

    pub fn vector_id(&self) -> String {
        vector_id(&self.sentence, &self.metadata)
    }
}

/// Hex SHA-256 over the sentence followed by the metadata's JSON form.
pub fn vector_id(sentence: &str, metadata: &SentenceMetadata) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sentence.as_bytes());
    // Field order is fixed by the struct, so the JSON form is canonical.
    if let Ok(encoded) = serde_json::to_vec(metadata) {
        hasher.update(&encoded);
    }
    format!("{:x}", hasher.finalize())
}
