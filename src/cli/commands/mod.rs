//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod diagnose;
mod doctor;
mod index;
mod init;
mod lab;
mod monitor;
mod prices;
mod profit;
mod search;
mod serve;
mod weather;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use diagnose::run_diagnose;
pub use doctor::run_doctor;
pub use index::run_index;
pub use init::run_init;
pub use lab::run_lab;
pub use monitor::run_monitor;
pub use prices::run_prices;
pub use profit::run_profit;
pub use search::run_search;
pub use serve::run_serve;
pub use weather::run_weather;

use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::vector_store::{MemoryVectorStore, SqliteVectorStore, VectorStore};
use std::sync::Arc;

/// Open the configured vector store and embedder.
pub(crate) fn open_components(
    settings: &Settings,
) -> Result<(Arc<dyn VectorStore>, Arc<dyn Embedder>)> {
    let store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
        "memory" => Arc::new(MemoryVectorStore::new()),
        _ => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
    };

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ));

    Ok((store, embedder))
}
