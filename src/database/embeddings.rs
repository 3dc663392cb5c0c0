// file: src/database/embeddings.rs
// description: OpenAI-compatible embeddings client with deterministic fallback
// reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::config::LlmConfig;
use crate::error::{PipelineError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

pub struct EmbeddingClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    dim: usize,
}

impl EmbeddingClient {
    pub fn new(config: &LlmConfig, dim: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PipelineError::Embedding(format!("Failed to build HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            warn!("No API key configured - using fallback embeddings");
        }

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.embedding_model.clone(),
            dim,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embeddings for `texts` in input order. Falls back to local vectors
    /// when the endpoint is unavailable or returns the wrong width.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let Some(api_key) = &self.api_key else {
            debug!("Using fallback embedding for {} texts", texts.len());
            return Ok(Self::fallback_batch(texts, self.dim));
        };

        match self.request_embeddings(api_key, texts).await {
            Ok(embeddings) if embeddings.iter().all(|e| e.len() == self.dim) => Ok(embeddings),
            Ok(embeddings) => {
                warn!(
                    "Embedding endpoint returned dimension {}, expected {}. Using fallback.",
                    embeddings.first().map(Vec::len).unwrap_or(0),
                    self.dim
                );
                Ok(Self::fallback_batch(texts, self.dim))
            }
            Err(e) => {
                warn!("Embedding request failed: {}. Using fallback.", e);
                Ok(Self::fallback_batch(texts, self.dim))
            }
        }
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| PipelineError::Embedding("No embedding returned".to_string()))
    }

    async fn request_embeddings(&self, api_key: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.api_base);
        let request = EmbeddingRequest {
            input: texts,
            model: &self.model,
        };

        debug!("Requesting {} embeddings from {}", texts.len(), self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                PipelineError::Embedding(format!("Failed to send embedding request: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Embedding(format!(
                "Embedding request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            PipelineError::Embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        Self::ordered(body, texts.len())
    }

    fn ordered(mut body: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
        if body.data.len() != expected {
            return Err(PipelineError::Embedding(format!(
                "Expected {} embeddings, got {}",
                expected,
                body.data.len()
            )));
        }
        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }

    fn fallback_batch(texts: &[String], dim: usize) -> Vec<Vec<f32>> {
        texts
            .iter()
            .map(|text| Self::generate_fallback_embedding(text, dim))
            .collect()
    }

    /// Hashed bag-of-words vector, L2-normalized. Texts sharing words land
    /// close together, which keeps offline search usable.
    pub fn generate_fallback_embedding(text: &str, dim: usize) -> Vec<f32> {
        let mut vector = vec![0.0f32; dim];
        if dim == 0 {
            return vector;
        }

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            vector[(hash % dim as u64) as usize] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf29ce484222325u64, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_fallback_embedding_shape() {
        let embedding = EmbeddingClient::generate_fallback_embedding("test text", 384);
        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|v| v * v).sum();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_fallback_embedding_deterministic_and_case_insensitive() {
        let emb1 = EmbeddingClient::generate_fallback_embedding("Shorelines on Mars", 128);
        let emb2 = EmbeddingClient::generate_fallback_embedding("shorelines on mars", 128);
        assert_eq!(emb1, emb2);
    }

    #[test]
    fn test_fallback_embedding_similarity() {
        let query = EmbeddingClient::generate_fallback_embedding("shorelines mars", 256);
        let close = EmbeddingClient::generate_fallback_embedding("Evidence of shorelines on Mars", 256);
        let far = EmbeddingClient::generate_fallback_embedding("Protein folding kinetics", 256);
        assert!(cosine(&query, &close) > cosine(&query, &far));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedding = EmbeddingClient::generate_fallback_embedding("  ", 8);
        assert!(embedding.iter().all(|&v| v == 0.0));
    }

    #[tokio::test]
    async fn test_embed_batch_without_key_uses_fallback() {
        let mut config = Config::default_config().llm;
        config.api_key = None;
        let client = EmbeddingClient::new(&config, 16).unwrap();

        let texts = vec!["one".to_string(), "two".to_string()];
        let embeddings = client.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 2);
        assert!(embeddings.iter().all(|e| e.len() == 16));
        assert!(client.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_response_reordered_by_index() {
        let body: EmbeddingResponse = serde_json::from_str(
            r#"{"data":[{"index":1,"embedding":[2.0]},{"index":0,"embedding":[1.0]}]}"#,
        )
        .unwrap();
        let ordered = EmbeddingClient::ordered(body, 2).unwrap();
        assert_eq!(ordered, vec![vec![1.0], vec![2.0]]);
    }
}
