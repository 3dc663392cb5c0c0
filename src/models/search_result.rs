// file: src/models/search_result.rs
// description: Search result model with similarity scores
// reference: Used for vector similarity search results

use crate::models::sentence::SentenceMetadata;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Vector id of the stored sentence
    pub id: String,

    pub sentence: String,

    pub metadata: SentenceMetadata,

    /// Similarity score (higher is more similar, 0.0-1.0)
    pub score: f32,

    /// Distance metric (lower is more similar)
    pub distance: Option<f32>,
}

impl SearchResult {
    pub fn new(
        id: String,
        sentence: String,
        metadata: SentenceMetadata,
        distance: Option<f32>,
    ) -> Self {
        // score = 1 / (1 + distance)
        let score = distance.map(|d| 1.0 / (1.0 + d)).unwrap_or(1.0);
        Self {
            id,
            sentence,
            metadata,
            score,
            distance,
        }
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_sentence_len: usize) -> String {
        let preview = if self.sentence.chars().count() > max_sentence_len {
            let cut: String = self.sentence.chars().take(max_sentence_len).collect();
            format!("{}...", cut)
        } else {
            self.sentence.clone()
        };

        format!(
            "Score: {:.4} | {} ({}) #{}\n{}\n",
            self.score,
            self.metadata.title,
            self.metadata.year,
            self.metadata.phrase_number,
            preview
        )
    }
}
