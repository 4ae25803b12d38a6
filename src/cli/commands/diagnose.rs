//! Disease diagnosis command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::DiseaseDiagnoser;
use anyhow::Result;
use std::path::Path;

/// Multimodal model used for image diagnosis.
const DIAGNOSIS_MODEL: &str = "gpt-4o";

/// Run the diagnose command.
pub async fn run_diagnose(image: &str, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Diagnose) {
        Output::error(&format!("{}", e));
        Output::info("Run 'roost doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let diagnoser = DiseaseDiagnoser::new(DIAGNOSIS_MODEL, settings.prompts.diagnosis.clone());

    let spinner = Output::spinner("Analyzing the image...");

    match diagnoser.diagnose(Path::new(image)).await {
        Ok(diagnosis) => {
            spinner.finish_and_clear();
            Output::header("Diagnosis Result");
            println!("\n{}\n", diagnosis);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Diagnosis failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
