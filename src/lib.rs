//! Roost - Poultry Farming Knowledge Assistant
//!
//! A CLI and HTTP assistant that answers poultry-farming questions with a
//! retrieval-augmented pipeline over a fixed reference corpus, enriched
//! with live web and video search, plus single-shot husbandry tools.
//!
//! # Overview
//!
//! Roost allows you to:
//! - Index a set of reference documents into a searchable vector database
//! - Ask questions and get composite answers with document, web, and video sources
//! - Get weather-based husbandry advisories for a city
//! - Analyze veterinary lab reports and diagnose diseases from bird images
//! - Calculate farm profit and track egg market prices
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `extract` - Document content extraction (PDF, CSV, text, OCR)
//! - `chunking` - Overlapping-window text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Similarity index abstraction
//! - `indexer` - Offline corpus indexing
//! - `gate` - Query relevance gating
//! - `rag` - Retrieval and answer generation
//! - `search` - Web and video search enrichment
//! - `pipeline` - The composite answering pipeline
//! - `weather` - Weather advisories
//! - `tools` - Lab analysis, disease diagnosis, profit calculator
//! - `prices` - Egg price scraping and structure monitoring
//!
//! # Example
//!
//! ```rust,no_run
//! use roost::config::Settings;
//! use roost::embedding::OpenAIEmbedder;
//! use roost::pipeline::{Assistant, Session};
//! use roost::vector_store::SqliteVectorStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);
//!     let embedder = Arc::new(OpenAIEmbedder::with_config(
//!         &settings.embedding.model,
//!         settings.embedding.dimensions as usize,
//!     ));
//!
//!     let assistant = Assistant::from_settings(&settings, store, embedder)?;
//!     let mut session = Session::new();
//!
//!     let answer = assistant
//!         .answer(&mut session, "What temperature do day-old chicks need?")
//!         .await?;
//!     println!("{}", answer.render());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod gate;
pub mod indexer;
pub mod openai;
pub mod pipeline;
pub mod prices;
pub mod rag;
pub mod search;
pub mod tools;
pub mod vector_store;
pub mod weather;

pub use error::{Result, RoostError};
