use anyhow::Result;
use std::cmp::Ordering;

use crate::ingestion::{Chunk, Embedder};

/// A chunk returned from a similarity query
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
}

/// In-memory similarity index over one session's chunks
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<(Chunk, Vec<f32>)>,
}

impl VectorIndex {
    /// Embed every chunk and index it
    pub async fn build(embedder: &dyn Embedder, chunks: &[Chunk]) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed(&texts).await?;

        if embeddings.len() != chunks.len() {
            anyhow::bail!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            );
        }

        Ok(Self {
            entries: chunks.iter().cloned().zip(embeddings).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` chunks by cosine similarity to `query`, best first
    pub async fn similarity_search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = embedder.embed_query(query).await?;
        Ok(self.nearest(&query_embedding, k))
    }

    pub fn nearest(&self, query_embedding: &[f32], k: usize) -> Vec<SearchResult> {
        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(query_embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity; 0.0 when either vector is all zeros or lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::{ChunkMetadata, HashingEmbedder};
    use std::path::PathBuf;

    fn chunk(content: &str, source: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            metadata: ChunkMetadata {
                source: source.to_string(),
                path: PathBuf::from(format!("/tmp/{}", source)),
            },
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_similarity_search_ranks_matching_chunk_first() {
        let embedder = HashingEmbedder::default();
        let chunks = vec![
            chunk("Mitochondria produce energy for the cell.", "bio.txt"),
            chunk("Paris is the capital of France.", "geo.txt"),
            chunk("The French Revolution began in 1789.", "history.txt"),
            chunk("Photosynthesis happens in chloroplasts.", "bio.txt"),
        ];
        let index = VectorIndex::build(&embedder, &chunks).await.unwrap();
        assert_eq!(index.len(), 4);

        let results = index
            .similarity_search(&embedder, "What is the capital of France?", 3)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.metadata.source, "geo.txt");
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[tokio::test]
    async fn test_search_on_empty_index() {
        let embedder = HashingEmbedder::default();
        let index = VectorIndex::build(&embedder, &[]).await.unwrap();
        assert!(index.is_empty());

        let results = index.similarity_search(&embedder, "anything", 3).await.unwrap();
        assert!(results.is_empty());
    }
}
