//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, DocChunk, IndexedSource, SearchResult, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    chunks: RwLock<HashMap<String, DocChunk>>,
    embedding_model: RwLock<Option<String>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
            embedding_model: RwLock::new(None),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, chunk: &DocChunk) -> Result<()> {
        let mut chunks = self.chunks.write().unwrap();
        chunks.insert(chunk.id.to_string(), chunk.clone());
        Ok(())
    }

    async fn upsert_batch(&self, batch: &[DocChunk]) -> Result<usize> {
        let mut chunks = self.chunks.write().unwrap();
        for chunk in batch {
            chunks.insert(chunk.id.to_string(), chunk.clone());
        }
        Ok(batch.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let chunks = self.chunks.read().unwrap();

        let mut results: Vec<SearchResult> = chunks
            .values()
            .map(|chunk| {
                let score = cosine_similarity(query_embedding, &chunk.embedding);
                SearchResult {
                    chunk: chunk.clone(),
                    score,
                }
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn delete_by_source(&self, source: &str) -> Result<usize> {
        let mut chunks = self.chunks.write().unwrap();
        let initial_len = chunks.len();
        chunks.retain(|_, chunk| chunk.source != source);
        Ok(initial_len - chunks.len())
    }

    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let chunks = self.chunks.read().unwrap();

        let mut source_map: HashMap<String, IndexedSource> = HashMap::new();

        for chunk in chunks.values() {
            let entry = source_map
                .entry(chunk.source.clone())
                .or_insert_with(|| IndexedSource {
                    source: chunk.source.clone(),
                    chunk_count: 0,
                    indexed_at: chunk.indexed_at,
                });

            entry.chunk_count += 1;
            if chunk.indexed_at > entry.indexed_at {
                entry.indexed_at = chunk.indexed_at;
            }
        }

        let mut sources: Vec<IndexedSource> = source_map.into_values().collect();
        sources.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));

        Ok(sources)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let chunks = self.chunks.read().unwrap();
        Ok(chunks.len())
    }

    async fn embedding_model(&self) -> Result<Option<String>> {
        Ok(self.embedding_model.read().unwrap().clone())
    }

    async fn set_embedding_model(&self, model_id: &str) -> Result<()> {
        *self.embedding_model.write().unwrap() = Some(model_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::ChunkKind;

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        let chunk1 = DocChunk::new(
            "poultry1.pdf".to_string(),
            ChunkKind::Text,
            "Ventilation requirements for broiler houses".to_string(),
            None,
            vec![1.0, 0.0, 0.0],
            0,
        );

        let chunk2 = DocChunk::new(
            "poultry1.pdf".to_string(),
            ChunkKind::Text,
            "Layer feed composition".to_string(),
            None,
            vec![0.0, 1.0, 0.0],
            1,
        );

        store.upsert_batch(&[chunk1, chunk2]).await.unwrap();

        assert_eq!(store.chunk_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].chunk_count, 2);
    }
}
