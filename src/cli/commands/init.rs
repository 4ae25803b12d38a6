//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// Simple check result for init command.
struct CheckIssue {
    name: String,
    hint: String,
}

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Roost Setup");
    println!();
    println!("Welcome to Roost! Let's make sure everything is configured correctly.\n");

    // Step 1: Check optional extraction tools
    println!("{}", style("Step 1: Checking extraction tools").bold().cyan());
    println!();

    let tool_issues = check_tools();

    if !tool_issues.is_empty() {
        Output::warning("Some optional tools are missing:");
        println!();
        for issue in &tool_issues {
            println!("  {} {} - not found", style("!").yellow(), style(&issue.name).bold());
            println!("    {} {}", style("→").dim(), style(&issue.hint).dim());
        }
        println!();
        println!("  OCR for image lab reports needs tesseract; page-image extraction needs pdftoppm.");
        println!("  Everything else works without them.");
    } else {
        Output::success("All extraction tools are installed!");
    }

    println!();

    // Step 2: Check API keys
    println!("{}", style("Step 2: Checking API configuration").bold().cyan());
    println!();

    if std::env::var("OPENAI_API_KEY").is_err() {
        Output::warning("OPENAI_API_KEY environment variable is not set.");
        println!();
        println!("  Roost requires an OpenAI API key for answers and embeddings.");
        println!("  Get your API key from: {}", style("https://platform.openai.com/api-keys").underlined());
        println!();
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
        println!();

        if !prompt_continue("Continue without API key?")? {
            println!();
            Output::info("Setup cancelled. Set your API key and run 'roost init' again.");
            return Ok(());
        }
    } else {
        Output::success("OpenAI API key is configured!");
    }

    for (key, purpose) in [
        ("WEATHER_API_KEY", "weather advisories"),
        ("GOOGLE_SEARCH_API_KEY", "web search enrichment"),
        ("GOOGLE_CSE_ID", "web search enrichment"),
        ("YOUTUBE_API_KEY", "video search enrichment"),
    ] {
        if std::env::var(key).is_err() {
            Output::info(&format!("{} not set; {} will be unavailable.", key, purpose));
        }
    }

    println!();

    // Step 3: Create directories
    println!("{}", style("Step 3: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    let docs_dir = settings.documents_dir();

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    if !docs_dir.exists() {
        std::fs::create_dir_all(&docs_dir)?;
        Output::success(&format!("Created document directory: {}", docs_dir.display()));
        println!();
        println!(
            "  Place your reference documents there and list them under {} in the config.",
            style("[documents]").green()
        );
    } else {
        Output::info(&format!("Document directory exists: {}", docs_dir.display()));
    }

    println!();

    // Step 4: Create config file
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        // Create parent directory if needed
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("roost config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("roost doctor").cyan());
    println!("  {} Build the document index", style("roost index").cyan());
    println!("  {} Ask your first question", style("roost ask \"<question>\"").cyan());
    println!();
    println!("For more help: {}", style("roost --help").cyan());

    Ok(())
}

/// Check optional extraction tools and return any issues.
fn check_tools() -> Vec<CheckIssue> {
    use std::process::Command;

    let mut issues = Vec::new();

    if Command::new("tesseract").arg("--version").output().is_err() {
        issues.push(CheckIssue {
            name: "tesseract".to_string(),
            hint: install_hint("tesseract").to_string(),
        });
    }

    if Command::new("pdftoppm").arg("-v").output().is_err() {
        issues.push(CheckIssue {
            name: "pdftoppm".to_string(),
            hint: install_hint("pdftoppm").to_string(),
        });
    }

    issues
}

/// Get platform-specific install hint.
fn install_hint(tool: &str) -> &'static str {
    match tool {
        "tesseract" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install tesseract"
            } else if cfg!(target_os = "linux") {
                "Install with: sudo apt install tesseract-ocr"
            } else {
                "Install from: https://github.com/tesseract-ocr/tesseract"
            }
        }
        "pdftoppm" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install poppler"
            } else if cfg!(target_os = "linux") {
                "Install with: sudo apt install poppler-utils"
            } else {
                "Install from: https://poppler.freedesktop.org/"
            }
        }
        _ => "Check the documentation for installation instructions",
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_hint_tesseract() {
        let hint = install_hint("tesseract");
        assert!(hint.contains("tesseract"));
    }

    #[test]
    fn test_install_hint_pdftoppm() {
        let hint = install_hint("pdftoppm");
        assert!(!hint.is_empty());
    }
}
