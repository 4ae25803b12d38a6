//! Vector store abstraction for Roost.
//!
//! Provides a trait-based interface for different similarity index backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of content a chunk carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    /// Plain extracted text.
    Text,
    /// A tabular dump serialized to text.
    Table,
    /// An image artifact; content may be empty, `image_path` points at it.
    Image,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Text => "text",
            ChunkKind::Table => "table",
            ChunkKind::Image => "image",
        }
    }
}

impl std::str::FromStr for ChunkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(ChunkKind::Text),
            "table" => Ok(ChunkKind::Table),
            "image" => Ok(ChunkKind::Image),
            other => Err(format!("Unknown chunk kind: {}", other)),
        }
    }
}

/// A document chunk stored in the similarity index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocChunk {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Name of the source document this chunk came from.
    pub source: String,
    /// What this chunk carries.
    pub kind: ChunkKind,
    /// Text content. Non-empty for text and table chunks.
    pub content: String,
    /// Pointer to an external image artifact (image chunks only).
    pub image_path: Option<String>,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Order of this chunk within its source document.
    pub chunk_order: i32,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl DocChunk {
    /// Create a new chunk.
    pub fn new(
        source: String,
        kind: ChunkKind,
        content: String,
        image_path: Option<String>,
        embedding: Vec<f32>,
        chunk_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            kind,
            content,
            image_path,
            embedding,
            chunk_order,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub chunk: DocChunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about an indexed source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSource {
    /// Source document name.
    pub source: String,
    /// Number of indexed chunks.
    pub chunk_count: u32,
    /// When the document was indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for similarity index implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a chunk with its embedding.
    async fn upsert(&self, chunk: &DocChunk) -> Result<()>;

    /// Bulk upsert chunks.
    async fn upsert_batch(&self, chunks: &[DocChunk]) -> Result<usize>;

    /// Search for similar chunks, most similar first.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Delete chunks by source document name.
    async fn delete_by_source(&self, source: &str) -> Result<usize>;

    /// List all indexed source documents.
    async fn list_sources(&self) -> Result<Vec<IndexedSource>>;

    /// Get total chunk count.
    async fn chunk_count(&self) -> Result<usize>;

    /// Identifier of the embedding model the index was built with.
    async fn embedding_model(&self) -> Result<Option<String>>;

    /// Record the embedding model identifier alongside the index.
    async fn set_embedding_model(&self, model_id: &str) -> Result<()>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
