//! RAG (Retrieval-Augmented Generation) for question answering with sources.
//!
//! Retrieves the most similar reference chunks for a query and conditions
//! answer generation on them.

pub mod context;
mod response;

pub use context::{format_context_for_prompt, ContextBuilder};
pub use response::{Generator, RagEngine};

use crate::vector_store::{ChunkKind, SearchResult};

/// A retrieved chunk prepared for prompting and citation.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Source document name.
    pub source: String,
    /// What the chunk carries.
    pub kind: ChunkKind,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            source: result.chunk.source,
            kind: result.chunk.kind,
            content: result.chunk.content,
            score: result.score,
        }
    }
}
