//! Ask command implementation.

use super::open_components;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{Assistant, Session};
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    retrieval_k: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'roost doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(k) = retrieval_k {
        settings.rag.retrieval_k = k;
    }

    let (store, embedder) = open_components(&settings)?;
    let assistant = Assistant::from_settings(&settings, store, embedder)?;
    let mut session = Session::new();

    let spinner = Output::spinner("Searching knowledge base...");

    match assistant.answer(&mut session, question).await {
        Ok(composite) => {
            spinner.finish_and_clear();
            println!("\n{}\n", composite.render());

            if !composite.sources.is_empty() {
                Output::header("Sources");
                for source in &composite.sources {
                    Output::search_result(&source.source, source.score, &source.content);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
