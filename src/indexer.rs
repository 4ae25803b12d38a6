//! Offline document indexing.
//!
//! Ingests the fixed reference corpus: extracts text and tabular content,
//! splits text into overlapping windows, embeds every chunk, and writes the
//! result into the similarity index together with its source tag and the
//! embedding model identity.

use crate::chunking::TextSplitter;
use crate::config::Settings;
use crate::embedding::Embedder;
use crate::error::{Result, RoostError};
use crate::extract::{self, ExtractedDocument};
use crate::vector_store::{ChunkKind, DocChunk, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of an index build.
#[derive(Debug)]
pub struct IndexStats {
    /// Number of documents processed.
    pub documents: usize,
    /// Number of chunks written to the index.
    pub chunks: usize,
}

/// Builds and refreshes the similarity index.
pub struct Indexer {
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    /// Where rendered page images land; None disables image extraction.
    image_dir: Option<PathBuf>,
}

impl Indexer {
    /// Create an indexer from settings and shared components.
    pub fn new(
        settings: &Settings,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let splitter =
            TextSplitter::new(settings.chunking.chunk_size, settings.chunking.overlap)?;

        Ok(Self {
            splitter,
            embedder,
            vector_store,
            image_dir: Some(settings.data_dir().join("extracted_pages")),
        })
    }

    /// Create an indexer with explicit components (used by tests).
    pub fn with_components(
        splitter: TextSplitter,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        image_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            splitter,
            embedder,
            vector_store,
            image_dir,
        }
    }

    /// Build the index from the given document paths.
    ///
    /// All paths are verified before any extraction starts. Re-running with
    /// an unchanged document set and parameters produces the same chunk
    /// boundaries and count; previously indexed chunks of each source are
    /// replaced, not duplicated.
    #[instrument(skip(self, paths), fields(documents = paths.len()))]
    pub async fn build(&self, paths: &[PathBuf]) -> Result<IndexStats> {
        for path in paths {
            if !path.exists() {
                return Err(RoostError::DocumentNotFound(path.display().to_string()));
            }
        }

        self.guard_embedding_model().await?;

        let mut total_chunks = 0usize;
        for path in paths {
            let doc = extract::extract_document(path, self.image_dir.as_deref()).await?;
            total_chunks += self.index_document(&doc).await?;
        }

        info!(
            "Indexed {} chunks from {} documents",
            total_chunks,
            paths.len()
        );

        Ok(IndexStats {
            documents: paths.len(),
            chunks: total_chunks,
        })
    }

    /// Refuse to mix embedding model versions within one index.
    async fn guard_embedding_model(&self) -> Result<()> {
        match self.vector_store.embedding_model().await? {
            Some(existing) if existing != self.embedder.model_id() => {
                Err(RoostError::Config(format!(
                    "Index was built with embedding model '{}' but '{}' is configured. \
                     Rebuild the index or restore the original model.",
                    existing,
                    self.embedder.model_id()
                )))
            }
            Some(_) => Ok(()),
            None => {
                self.vector_store
                    .set_embedding_model(self.embedder.model_id())
                    .await
            }
        }
    }

    /// Chunk, embed, and store a single extracted document.
    async fn index_document(&self, doc: &ExtractedDocument) -> Result<usize> {
        // (kind, content, image_path) per chunk, in deterministic order:
        // text windows first, then table dumps, then image artifacts.
        let mut pending: Vec<(ChunkKind, String, Option<String>)> = Vec::new();

        for window in self.splitter.split(&doc.text) {
            pending.push((ChunkKind::Text, window, None));
        }
        for table in &doc.tables {
            if !table.trim().is_empty() {
                pending.push((ChunkKind::Table, table.clone(), None));
            }
        }
        for image in &doc.images {
            pending.push((ChunkKind::Image, String::new(), Some(image.clone())));
        }

        if pending.is_empty() {
            return Err(RoostError::Extraction(format!(
                "Document {} produced no indexable chunks",
                doc.source
            )));
        }

        // Image chunks carry no text; embed a stable artifact label instead
        // so every chunk in the index has exactly one embedding.
        let texts: Vec<String> = pending
            .iter()
            .map(|(kind, content, image_path)| match kind {
                ChunkKind::Image => format!(
                    "image from {}: {}",
                    doc.source,
                    image_path.as_deref().unwrap_or("")
                ),
                _ => content.clone(),
            })
            .collect();

        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != pending.len() {
            return Err(RoostError::Embedding(format!(
                "Expected {} embeddings, got {}",
                pending.len(),
                embeddings.len()
            )));
        }

        let chunks: Vec<DocChunk> = pending
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(order, ((kind, content, image_path), embedding))| {
                DocChunk::new(
                    doc.source.clone(),
                    kind,
                    content,
                    image_path,
                    embedding,
                    order as i32,
                )
            })
            .collect();

        // Replace any earlier version of this source.
        let removed = self.vector_store.delete_by_source(&doc.source).await?;
        if removed > 0 {
            warn!("Replaced {} existing chunks for {}", removed, doc.source);
        }

        self.vector_store.upsert_batch(&chunks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use std::io::Write;

    /// Deterministic embedder for tests.
    struct StubEmbedder {
        model: String,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, 1.0, 0.0])
                .collect())
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_id(&self) -> &str {
            &self.model
        }
    }

    fn test_indexer(store: Arc<MemoryVectorStore>, model: &str) -> Indexer {
        Indexer::with_components(
            TextSplitter::new(50, 10).unwrap(),
            Arc::new(StubEmbedder {
                model: model.to_string(),
            }),
            store,
            None,
        )
    }

    fn corpus_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[tokio::test]
    async fn test_missing_document_fails_before_indexing() {
        let store = Arc::new(MemoryVectorStore::new());
        let indexer = test_indexer(store.clone(), "stub-model");

        let err = indexer
            .build(&[PathBuf::from("/nonexistent/poultry1.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, RoostError::DocumentNotFound(_)));
        assert_eq!(store.chunk_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_build_indexes_chunks_and_records_model() {
        let store = Arc::new(MemoryVectorStore::new());
        let indexer = test_indexer(store.clone(), "stub-model");

        let file = corpus_file(
            "Deep litter management keeps broiler houses dry. Turn the litter \
             weekly and keep moisture under twenty five percent to avoid \
             footpad lesions and ammonia spikes in the poultry house.",
        );

        let stats = indexer.build(&[file.path().to_path_buf()]).await.unwrap();
        assert_eq!(stats.documents, 1);
        assert!(stats.chunks > 1);
        assert_eq!(store.chunk_count().await.unwrap(), stats.chunks);
        assert_eq!(
            store.embedding_model().await.unwrap().as_deref(),
            Some("stub-model")
        );
    }

    #[tokio::test]
    async fn test_rebuild_is_idempotent() {
        let store = Arc::new(MemoryVectorStore::new());
        let indexer = test_indexer(store.clone(), "stub-model");

        let file = corpus_file(
            "Vaccination schedules for layers start with Marek's disease at \
             day one, then Newcastle and infectious bronchitis boosters at \
             regular intervals through the rearing period.",
        );
        let paths = vec![file.path().to_path_buf()];

        let first = indexer.build(&paths).await.unwrap();
        let second = indexer.build(&paths).await.unwrap();

        assert_eq!(first.chunks, second.chunks);
        assert_eq!(store.chunk_count().await.unwrap(), first.chunks);
    }

    #[tokio::test]
    async fn test_embedding_model_mismatch_rejected() {
        let store = Arc::new(MemoryVectorStore::new());
        store.set_embedding_model("other-model").await.unwrap();

        let indexer = test_indexer(store, "stub-model");
        let file = corpus_file("Some poultry content long enough to index.");

        let err = indexer
            .build(&[file.path().to_path_buf()])
            .await
            .unwrap_err();
        assert!(matches!(err, RoostError::Config(_)));
    }
}
