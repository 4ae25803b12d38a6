//! Lab report analysis command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::LabAnalyzer;
use anyhow::Result;
use std::path::Path;

/// Run the lab command.
pub async fn run_lab(file: &str, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Lab) {
        Output::error(&format!("{}", e));
        Output::info("Run 'roost doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let analyzer = LabAnalyzer::new(&settings.rag.model, settings.prompts.lab.clone());

    let spinner = Output::spinner("Analyzing lab report...");

    match analyzer.analyze_file(Path::new(file)).await {
        Ok(analysis) => {
            spinner.finish_and_clear();
            Output::header("Report Analysis");
            println!("\n{}\n", analysis);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Analysis failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
