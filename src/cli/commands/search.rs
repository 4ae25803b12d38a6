//! Search command implementation.

use super::open_components;
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::ContextBuilder;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    let (store, embedder) = open_components(&settings)?;
    let context_builder = ContextBuilder::new(store, embedder, limit);

    let spinner = Output::spinner("Searching...");

    let results = context_builder.build(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(chunks) => {
            if chunks.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", chunks.len()));

                for chunk in &chunks {
                    Output::search_result(&chunk.source, chunk.score, &chunk.content);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
