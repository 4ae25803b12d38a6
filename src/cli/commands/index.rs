//! Index command implementation.

use super::open_components;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::indexer::Indexer;
use anyhow::Result;
use std::path::PathBuf;

/// Run the index command.
pub async fn run_index(files: &[String], settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Index) {
        Output::error(&format!("{}", e));
        Output::info("Run 'roost doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let paths: Vec<PathBuf> = if files.is_empty() {
        settings.document_paths()
    } else {
        files.iter().map(PathBuf::from).collect()
    };

    if paths.is_empty() {
        Output::error("No documents configured. Add files under [documents] in the config.");
        return Ok(());
    }

    let (store, embedder) = open_components(&settings)?;
    let indexer = Indexer::new(&settings, embedder, store.clone())?;

    let spinner = Output::spinner(&format!("Indexing {} documents...", paths.len()));

    match indexer.build(&paths).await {
        Ok(stats) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Indexed {} chunks from {} documents",
                stats.chunks, stats.documents
            ));

            Output::header("Indexed Sources");
            for source in store.list_sources().await? {
                Output::source_info(&source.source, source.chunk_count);
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Indexing failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
