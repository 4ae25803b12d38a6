//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! The corpus is a handful of reference documents, so a brute-force scan
//! is plenty; larger datasets would want the sqlite-vec extension or a
//! dedicated vector database.

use super::{cosine_similarity, ChunkKind, DocChunk, IndexedSource, SearchResult, VectorStore};
use crate::error::{Result, RoostError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const META_EMBEDDING_MODEL: &str = "embedding_model";

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::create_tables(&conn)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::create_tables(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn create_tables(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                kind TEXT NOT NULL,
                content TEXT NOT NULL,
                image_path TEXT,
                embedding BLOB NOT NULL,
                chunk_order INTEGER NOT NULL,
                indexed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source);

            CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_chunk(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocChunk> {
        let id_str: String = row.get(0)?;
        let kind_str: String = row.get(2)?;
        let embedding_bytes: Vec<u8> = row.get(5)?;
        let indexed_at_str: String = row.get(7)?;

        Ok(DocChunk {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            source: row.get(1)?,
            kind: kind_str.parse().unwrap_or(ChunkKind::Text),
            content: row.get(3)?,
            image_path: row.get(4)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            chunk_order: row.get(6)?,
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, chunk))]
    async fn upsert(&self, chunk: &DocChunk) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RoostError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let embedding_bytes = Self::embedding_to_bytes(&chunk.embedding);

        conn.execute(
            r#"
            INSERT OR REPLACE INTO chunks
            (id, source, kind, content, image_path, embedding, chunk_order, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                chunk.id.to_string(),
                chunk.source,
                chunk.kind.as_str(),
                chunk.content,
                chunk.image_path,
                embedding_bytes,
                chunk.chunk_order,
                chunk.indexed_at.to_rfc3339(),
            ],
        )?;

        debug!("Upserted chunk {}", chunk.id);
        Ok(())
    }

    #[instrument(skip(self, chunks))]
    async fn upsert_batch(&self, chunks: &[DocChunk]) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RoostError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let tx = conn.unchecked_transaction()?;

        for chunk in chunks {
            let embedding_bytes = Self::embedding_to_bytes(&chunk.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks
                (id, source, kind, content, image_path, embedding, chunk_order, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    chunk.id.to_string(),
                    chunk.source,
                    chunk.kind.as_str(),
                    chunk.content,
                    chunk.image_path,
                    embedding_bytes,
                    chunk.chunk_order,
                    chunk.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} chunks", chunks.len());
        Ok(chunks.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RoostError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, source, kind, content, image_path, embedding, chunk_order, indexed_at
            FROM chunks
            "#,
        )?;

        let chunks = stmt.query_map([], Self::row_to_chunk)?;

        let mut results: Vec<SearchResult> = chunks
            .filter_map(|chunk_result| chunk_result.ok())
            .map(|chunk| {
                let score = cosine_similarity(query_embedding, &chunk.embedding);
                SearchResult { chunk, score }
            })
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_source(&self, source: &str) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RoostError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let deleted = conn.execute("DELETE FROM chunks WHERE source = ?1", params![source])?;

        info!("Deleted {} chunks for source {}", deleted, source);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RoostError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT source, COUNT(*) as chunk_count, MAX(indexed_at) as indexed_at
            FROM chunks
            GROUP BY source
            ORDER BY indexed_at DESC
            "#,
        )?;

        let sources = stmt.query_map([], |row| {
            let indexed_at_str: String = row.get(2)?;
            Ok(IndexedSource {
                source: row.get(0)?,
                chunk_count: row.get(1)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let result: Vec<IndexedSource> = sources.filter_map(|s| s.ok()).collect();
        Ok(result)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RoostError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn embedding_model(&self) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RoostError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let result = conn.query_row(
            "SELECT value FROM index_meta WHERE key = ?1",
            params![META_EMBEDDING_MODEL],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(model) => Ok(Some(model)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_embedding_model(&self, model_id: &str) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RoostError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        conn.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES (?1, ?2)",
            params![META_EMBEDDING_MODEL, model_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let chunk = DocChunk::new(
            "poultry1.pdf".to_string(),
            ChunkKind::Text,
            "Brooding temperature guidance".to_string(),
            None,
            vec![1.0, 0.0, 0.0],
            0,
        );

        store.upsert(&chunk).await.unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source, "poultry1.pdf");

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);

        let deleted = store.delete_by_source("poultry1.pdf").await.unwrap();
        assert_eq!(deleted, 1);

        let sources = store.list_sources().await.unwrap();
        assert!(sources.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_model_metadata() {
        let store = SqliteVectorStore::in_memory().unwrap();

        assert!(store.embedding_model().await.unwrap().is_none());

        store.set_embedding_model("text-embedding-3-small").await.unwrap();
        assert_eq!(
            store.embedding_model().await.unwrap().as_deref(),
            Some("text-embedding-3-small")
        );

        // Overwrite is allowed; the guard lives in the indexer.
        store.set_embedding_model("text-embedding-3-large").await.unwrap();
        assert_eq!(
            store.embedding_model().await.unwrap().as_deref(),
            Some("text-embedding-3-large")
        );
    }

    #[tokio::test]
    async fn test_image_chunk_empty_content() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let chunk = DocChunk::new(
            "poultry2.pdf".to_string(),
            ChunkKind::Image,
            String::new(),
            Some("extracted_pages/poultry2_page3.png".to_string()),
            vec![0.0, 1.0, 0.0],
            3,
        );

        store.upsert(&chunk).await.unwrap();

        let results = store.search(&[0.0, 1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].chunk.kind, ChunkKind::Image);
        assert!(results[0].chunk.content.is_empty());
        assert!(results[0].chunk.image_path.is_some());
    }
}
