//! Context building for RAG responses.

use super::ContextChunk;
use crate::embedding::Embedder;
use crate::error::{Result, RoostError};
use crate::vector_store::VectorStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Retrieves and prepares context chunks for a query.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    k: usize,
}

impl ContextBuilder {
    /// Create a new context builder retrieving up to `k` chunks per query.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, k: usize) -> Self {
        Self {
            vector_store,
            embedder,
            k,
        }
    }

    /// Retrieve the most similar chunks for a query.
    ///
    /// Results come back most similar first, deduplicated by exact content
    /// with first-seen rank preserved, at most `k` long. Fails with
    /// `IndexUnavailable` when the index has not been built, and refuses to
    /// query an index built with a different embedding model.
    pub async fn build(&self, query: &str) -> Result<Vec<ContextChunk>> {
        if self.vector_store.chunk_count().await? == 0 {
            return Err(RoostError::IndexUnavailable(
                "The document index is empty. Run 'roost index' first.".to_string(),
            ));
        }

        match self.vector_store.embedding_model().await? {
            None => {
                return Err(RoostError::IndexUnavailable(
                    "The document index has no recorded embedding model. Rebuild it with 'roost index'."
                        .to_string(),
                ));
            }
            Some(indexed_model) if indexed_model != self.embedder.model_id() => {
                return Err(RoostError::Config(format!(
                    "Index was built with embedding model '{}' but '{}' is configured. \
                     Retrieval quality would silently degrade; rebuild the index.",
                    indexed_model,
                    self.embedder.model_id()
                )));
            }
            Some(_) => {}
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = self.vector_store.search(&query_embedding, self.k).await?;

        // Deduplicate by exact content, keeping first-seen rank order.
        let mut seen = HashSet::new();
        let chunks: Vec<ContextChunk> = results
            .into_iter()
            .filter(|r| seen.insert(r.chunk.content.clone()))
            .map(ContextChunk::from)
            .collect();

        debug!("Retrieved {} context chunks for query", chunks.len());
        Ok(chunks)
    }
}

/// Format context chunks for inclusion in a generation prompt.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            format!("---\n[{}] {}\n{}\n---", i + 1, chunk.source, chunk.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{ChunkKind, DocChunk, MemoryVectorStore};
    use async_trait::async_trait;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_id(&self) -> &str {
            "stub-model"
        }
    }

    fn chunk(content: &str, embedding: Vec<f32>, order: i32) -> DocChunk {
        DocChunk::new(
            "poultry1.pdf".to_string(),
            ChunkKind::Text,
            content.to_string(),
            None,
            embedding,
            order,
        )
    }

    async fn seeded_store(chunks: Vec<DocChunk>) -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new());
        store.set_embedding_model("stub-model").await.unwrap();
        store.upsert_batch(&chunks).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_empty_index_is_unavailable() {
        let store = Arc::new(MemoryVectorStore::new());
        let builder = ContextBuilder::new(store, Arc::new(StubEmbedder), 3);

        let err = builder.build("poultry housing").await.unwrap_err();
        assert!(matches!(err, RoostError::IndexUnavailable(_)));
    }

    #[tokio::test]
    async fn test_model_mismatch_rejected() {
        let store = seeded_store(vec![chunk("a", vec![1.0, 0.0, 0.0], 0)]).await;
        store.set_embedding_model("different-model").await.unwrap();

        let builder = ContextBuilder::new(store, Arc::new(StubEmbedder), 3);
        let err = builder.build("poultry housing").await.unwrap_err();
        assert!(matches!(err, RoostError::Config(_)));
    }

    #[tokio::test]
    async fn test_results_bounded_and_deduplicated() {
        let store = seeded_store(vec![
            chunk("feeding schedule", vec![1.0, 0.0, 0.0], 0),
            chunk("feeding schedule", vec![0.9, 0.1, 0.0], 1),
            chunk("vaccination plan", vec![0.8, 0.2, 0.0], 2),
            chunk("housing density", vec![0.7, 0.3, 0.0], 3),
        ])
        .await;

        let builder = ContextBuilder::new(store, Arc::new(StubEmbedder), 3);
        let chunks = builder.build("how often to feed layers").await.unwrap();

        assert!(chunks.len() <= 3);
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let unique: HashSet<&&str> = contents.iter().collect();
        assert_eq!(unique.len(), contents.len());
        // The duplicate kept its first-seen (highest-scoring) rank.
        assert_eq!(chunks[0].content, "feeding schedule");
    }

    #[test]
    fn test_format_context_numbers_chunks() {
        let chunks = vec![
            ContextChunk {
                source: "poultry1.pdf".to_string(),
                kind: ChunkKind::Text,
                content: "first excerpt".to_string(),
                score: 0.9,
            },
            ContextChunk {
                source: "poultry2.pdf".to_string(),
                kind: ChunkKind::Text,
                content: "second excerpt".to_string(),
                score: 0.8,
            },
        ];

        let formatted = format_context_for_prompt(&chunks);
        assert!(formatted.contains("[1] poultry1.pdf"));
        assert!(formatted.contains("[2] poultry2.pdf"));
        assert!(formatted.contains("first excerpt"));
    }
}
