use std::hash::Hasher;

use anyhow::{Context, Result};
use async_trait::async_trait;
use fnv::FnvHasher;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Texts sent per embedding request
pub const EMBEDDING_BATCH_SIZE: usize = 64;

/// Maps text to fixed-dimensionality vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .context("Embedding provider returned no vector for the query")
    }
}

/// Client for an OpenAI-compatible `/embeddings` endpoint
#[derive(Clone)]
pub struct HttpEmbedder {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpEmbedder {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            let request_body = EmbeddingRequest {
                model: &self.model,
                input: batch,
            };

            let mut request = self
                .http_client
                .post(format!("{}/embeddings", self.base_url))
                .json(&request_body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = request
                .send()
                .await
                .context("Failed to call embedding API")?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                anyhow::bail!("Embedding API failed with status {}: {}", status, error_text);
            }

            let mut embedding_response: EmbeddingResponse = response
                .json()
                .await
                .context("Failed to parse embedding response")?;

            if embedding_response.data.len() != batch.len() {
                anyhow::bail!(
                    "Embedding API returned {} vectors for {} inputs",
                    embedding_response.data.len(),
                    batch.len()
                );
            }

            embedding_response.data.sort_by_key(|item| item.index);
            vectors.extend(embedding_response.data.into_iter().map(|item| item.embedding));
        }

        Ok(vectors)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Local embedder used when no embedding provider is configured.
///
/// Hashes lowercase word tokens into a fixed number of buckets and L2-normalises
/// the counts, so texts sharing vocabulary score high under cosine similarity.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub const DEFAULT_DIMENSIONS: usize = 384;

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let mut hasher = FnvHasher::default();
            hasher.write(token.as_bytes());
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            embedding[bucket] += 1.0;
        }

        // Normalize the embedding vector (L2 normalization)
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in &mut embedding {
                *val /= magnitude;
            }
        }

        embedding
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_embedding() {
        let embedder = HashingEmbedder::default();
        let embedding1 = embedder.embed_text("test text");
        let embedding2 = embedder.embed_text("Test TEXT");
        let embedding3 = embedder.embed_text("different words entirely");

        // Tokens are case-folded
        assert_eq!(embedding1, embedding2);
        assert_ne!(embedding1, embedding3);

        assert_eq!(embedding1.len(), 384);

        // L2 norm should be approximately 1.0
        let magnitude: f32 = embedding1.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_tokens_hash_to_fnv_buckets() {
        // FNV-1a 64 of "a" is 0xaf63dc4c8601ec8c, which lands in bucket 12 of 16
        let embedding = HashingEmbedder::new(16).embed_text("A");
        assert_eq!(embedding[12], 1.0);
        assert_eq!(embedding.iter().filter(|v| **v != 0.0).count(), 1);
    }

    #[test]
    fn test_empty_text_embeds_to_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        assert!(embedder.embed_text("  ...  ").iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_embed_query_returns_single_vector() {
        let embedder = HashingEmbedder::new(32);
        let vector = embedder.embed_query("capital of France").await.unwrap();
        assert_eq!(vector.len(), 32);
    }
}
